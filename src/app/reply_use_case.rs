use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::app::ports::ChatCompletionPort;
use crate::business::BusinessProfile;
use crate::observability::metrics;
use crate::types::{ChatMessage, IncomingMessage, ReplySource};

/// Use case that decides what the bot answers to an inbound message
#[derive(Clone)]
pub struct ReplyService {
    profile: BusinessProfile,
    chat: Option<Arc<dyn ChatCompletionPort>>,
}

impl ReplyService {
    pub fn new(profile: BusinessProfile, chat: Option<Arc<dyn ChatCompletionPort>>) -> Self {
        Self { profile, chat }
    }

    /// Service that always answers with the placeholder greeting
    pub fn without_model(profile: BusinessProfile) -> Self {
        Self::new(profile, None)
    }

    pub fn model_configured(&self) -> bool {
        self.chat.is_some()
    }

    pub fn profile(&self) -> &BusinessProfile {
        &self.profile
    }

    /// Produce the reply text. Never fails: model errors degrade to the fallback reply.
    ///
    /// Without a model every message gets the placeholder greeting, blank ones included.
    pub async fn reply(&self, message: &IncomingMessage) -> String {
        let (text, source) = self.reply_with_source(message).await;
        metrics::replies::sent(source);
        text
    }

    pub async fn reply_with_source(&self, message: &IncomingMessage) -> (String, ReplySource) {
        let Some(chat) = &self.chat else {
            return (self.profile.placeholder_reply().to_string(), ReplySource::Placeholder);
        };

        let body = message.body.trim();
        if body.is_empty() {
            debug!("Empty message body, sending fallback reply");
            return (self.profile.fallback_reply.clone(), ReplySource::Fallback);
        }

        let messages = [
            ChatMessage::system(self.profile.system_prompt()),
            ChatMessage::user(body),
        ];

        let started = Instant::now();
        match chat.complete(&messages).await {
            Ok(content) if !content.trim().is_empty() => {
                metrics::llm::request_success(started.elapsed().as_secs_f64());
                (content.trim().to_string(), ReplySource::Model)
            }
            Ok(_) => {
                metrics::llm::request_success(started.elapsed().as_secs_f64());
                warn!("Model returned an empty reply, sending fallback");
                (self.profile.fallback_reply.clone(), ReplySource::Fallback)
            }
            Err(e) => {
                metrics::llm::request_error(started.elapsed().as_secs_f64());
                warn!(error = %e, "Chat completion failed, sending fallback");
                (self.profile.fallback_reply.clone(), ReplySource::Fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BotError, Result};
    use crate::types::ChatRole;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedChat {
        answer: std::result::Result<String, u16>,
        seen: Mutex<Vec<ChatMessage>>,
    }

    impl ScriptedChat {
        fn answering(text: &str) -> Arc<Self> {
            Arc::new(Self { answer: Ok(text.to_string()), seen: Mutex::new(Vec::new()) })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self { answer: Err(status), seen: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl ChatCompletionPort for ScriptedChat {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            match &self.answer {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(BotError::Api { status: *status, body: "upstream down".into() }),
            }
        }
    }

    fn message(body: &str) -> IncomingMessage {
        IncomingMessage {
            from: "whatsapp:+5215512345678".into(),
            body: body.into(),
            to: "whatsapp:+14155238886".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn placeholder_without_model() {
        let service = ReplyService::without_model(BusinessProfile::default());
        let (text, source) = service.reply_with_source(&message("¿Cuál es el horario?")).await;
        assert_eq!(source, ReplySource::Placeholder);
        assert!(text.starts_with("¡Hola! Soy el asistente del Colegio."));
    }

    #[tokio::test]
    async fn blank_body_without_model_gets_placeholder() {
        let service = ReplyService::without_model(BusinessProfile::default());
        let (text, source) = service.reply_with_source(&message("")).await;
        assert_eq!(source, ReplySource::Placeholder);
        assert_eq!(text, crate::business::PLACEHOLDER_REPLY);
    }

    #[tokio::test]
    async fn blank_body_skips_the_model() {
        let chat = ScriptedChat::answering("no debería usarse");
        let service = ReplyService::new(
            BusinessProfile::default(),
            Some(chat.clone() as Arc<dyn ChatCompletionPort>),
        );

        let (text, source) = service.reply_with_source(&message("   ")).await;
        assert_eq!(source, ReplySource::Fallback);
        assert_eq!(text, "Te ayudo a agendar una cita.");
        assert!(chat.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn model_gets_profile_prompt_and_user_text() {
        let chat = ScriptedChat::answering("  Abrimos de 7am a 3pm.  ");
        let service = ReplyService::new(
            BusinessProfile::default(),
            Some(chat.clone() as Arc<dyn ChatCompletionPort>),
        );

        let (text, source) = service.reply_with_source(&message("¿Horario?")).await;
        assert_eq!(source, ReplySource::Model);
        assert_eq!(text, "Abrimos de 7am a 3pm.");

        let seen = chat.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].role, ChatRole::System);
        assert!(seen[0].content.contains("Lunes a Viernes 7am-3pm"));
        assert_eq!(seen[1], ChatMessage::user("¿Horario?"));
    }

    #[tokio::test]
    async fn model_failure_falls_back() {
        let service = ReplyService::new(
            BusinessProfile::default(),
            Some(ScriptedChat::failing(503) as Arc<dyn ChatCompletionPort>),
        );
        let (text, source) = service.reply_with_source(&message("Hola")).await;
        assert_eq!(source, ReplySource::Fallback);
        assert_eq!(text, "Te ayudo a agendar una cita.");
    }

    #[tokio::test]
    async fn empty_model_answer_falls_back() {
        let service = ReplyService::new(
            BusinessProfile::default(),
            Some(ScriptedChat::answering("\n") as Arc<dyn ChatCompletionPort>),
        );
        let (_, source) = service.reply_with_source(&message("Hola")).await;
        assert_eq!(source, ReplySource::Fallback);
    }
}
