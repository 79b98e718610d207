use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Form fields Twilio posts for an inbound WhatsApp message.
///
/// Twilio sends many more fields; only the ones the bot reads are kept.
/// Missing fields become empty strings so a sparse request is still answered.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomingMessage {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "To", default)]
    pub to: String,
    #[serde(rename = "MessageSid", default)]
    pub message_sid: Option<String>,
    #[serde(rename = "ProfileName", default)]
    pub profile_name: Option<String>,
}

impl IncomingMessage {
    pub fn sender(&self) -> Sender {
        Sender::parse(&self.from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    WhatsApp,
    Sms,
}

/// Sender address split into channel and number, e.g. `whatsapp:+5215512345678`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub channel: Channel,
    pub address: String,
}

static CHANNEL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)(whatsapp):\s*(.*)$").expect("valid channel regex"));

impl Sender {
    pub fn parse(from: &str) -> Self {
        let from = from.trim();
        match CHANNEL_PREFIX.captures(from) {
            Some(caps) => Sender {
                channel: Channel::WhatsApp,
                address: caps[2].trim().to_string(),
            },
            None => Sender {
                channel: Channel::Sms,
                address: from.to_string(),
            },
        }
    }
}

/// Body returned to Twilio after a message is handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookReply {
    pub status: String,
    pub user: String,
    pub bot_response: String,
}

impl WebhookReply {
    pub fn received(user: impl Into<String>, bot_response: impl Into<String>) -> Self {
        Self {
            status: "received".to_string(),
            user: user.into(),
            bot_response: bot_response.into(),
        }
    }
}

/// Body returned when the webhook request could not be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookError {
    pub status: String,
    pub detail: String,
}

impl WebhookError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// Where a reply text came from; used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Model,
    Fallback,
    Placeholder,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Model => "model",
            ReplySource::Fallback => "fallback",
            ReplySource::Placeholder => "placeholder",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whatsapp_sender() {
        let sender = Sender::parse("whatsapp:+5215512345678");
        assert_eq!(sender.channel, Channel::WhatsApp);
        assert_eq!(sender.address, "+5215512345678");
    }

    #[test]
    fn plain_number_is_sms() {
        let sender = Sender::parse(" +15005550006 ");
        assert_eq!(sender.channel, Channel::Sms);
        assert_eq!(sender.address, "+15005550006");
    }

    #[test]
    fn empty_sender_has_empty_address() {
        assert_eq!(Sender::parse("").address, "");
    }

    #[test]
    fn chat_roles_serialize_lowercase() {
        let json = serde_json::to_value(ChatMessage::system("hola")).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "system", "content": "hola" }));
    }
}
