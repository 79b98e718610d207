//! Business profile the assistant is allowed to talk about.
//!
//! The model only ever sees what is rendered by [`BusinessProfile::system_prompt`],
//! so every fact the bot can state lives in this struct.

use serde::{Deserialize, Serialize};

/// Reply sent while no language model is configured.
pub const PLACEHOLDER_REPLY: &str =
    "¡Hola! Soy el asistente del Colegio. Próximamente responderé automáticamente.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessProfile {
    pub name: String,
    pub hours: String,
    pub location: String,
    pub services: Vec<String>,
    pub enrollment_fee: String,
    pub booking_url: String,
    /// Answer used when the question is outside the profile or the model fails
    pub fallback_reply: String,
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self {
            name: "Colegio".to_string(),
            hours: "Lunes a Viernes 7am-3pm".to_string(),
            location: "[TU DIRECCIÓN AQUÍ]".to_string(),
            services: vec!["Primaria".to_string(), "Secundaria".to_string()],
            enrollment_fee: "$5,000 MXN".to_string(),
            booking_url: "https://calendly.com/tu-colegio".to_string(),
            fallback_reply: "Te ayudo a agendar una cita.".to_string(),
        }
    }
}

impl BusinessProfile {
    /// Render the system prompt that pins the model to this profile.
    pub fn system_prompt(&self) -> String {
        format!(
            "Eres el asistente virtual del {name}.\n\
             Información clave:\n\
             - Horarios: {hours}\n\
             - Ubicación: {location}\n\
             - Servicios: {services}\n\
             - Costo inscripción: {fee}\n\
             - Agendar visita: {booking}\n\
             Responde solo con esta información. Si no sabes algo, di: '{fallback}'",
            name = self.name,
            hours = self.hours,
            location = self.location,
            services = self.services.join(", "),
            fee = self.enrollment_fee,
            booking = self.booking_url,
            fallback = self.fallback_reply,
        )
    }

    pub fn placeholder_reply(&self) -> &'static str {
        PLACEHOLDER_REPLY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_mentions_every_fact() {
        let profile = BusinessProfile::default();
        let prompt = profile.system_prompt();

        assert!(prompt.starts_with("Eres el asistente virtual del Colegio."));
        assert!(prompt.contains("- Horarios: Lunes a Viernes 7am-3pm"));
        assert!(prompt.contains("- Servicios: Primaria, Secundaria"));
        assert!(prompt.contains("- Costo inscripción: $5,000 MXN"));
        assert!(prompt.contains("https://calendly.com/tu-colegio"));
        assert!(prompt.ends_with("di: 'Te ayudo a agendar una cita.'"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let profile: BusinessProfile = toml::from_str(
            r#"
            location = "Av. Reforma 123, CDMX"
            services = ["Preescolar", "Primaria"]
            "#,
        )
        .unwrap();

        assert_eq!(profile.location, "Av. Reforma 123, CDMX");
        assert_eq!(profile.services, vec!["Preescolar", "Primaria"]);
        assert_eq!(profile.hours, BusinessProfile::default().hours);
    }
}
