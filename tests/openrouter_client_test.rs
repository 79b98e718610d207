use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;

use whatsapp_assistant::app::ports::ChatCompletionPort;
use whatsapp_assistant::app::ReplyService;
use whatsapp_assistant::business::BusinessProfile;
use whatsapp_assistant::config::OpenRouterConfig;
use whatsapp_assistant::error::BotError;
use whatsapp_assistant::infra::OpenRouterClient;
use whatsapp_assistant::types::{ChatMessage, IncomingMessage, ReplySource};

fn config_for(server: &MockServer) -> OpenRouterConfig {
    OpenRouterConfig {
        api_key: Some("sk-or-v1-test".to_string()),
        api_url: server.url("/api/v1/chat/completions"),
        ..OpenRouterConfig::default()
    }
}

#[tokio::test]
async fn sends_model_messages_and_bearer_key() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/chat/completions")
                .header("authorization", "Bearer sk-or-v1-test")
                .header("content-type", "application/json")
                .json_body(json!({
                    "model": "google/gemini-2.0-flash-exp:free",
                    "messages": [
                        {
                            "role": "system",
                            "content": "Eres un asistente útil. Responde en español."
                        },
                        { "role": "user", "content": "Hola, ¿puedes saludarme?" }
                    ],
                    "max_tokens": 100
                }));
            then.status(200).json_body(json!({
                "id": "gen-1",
                "choices": [
                    {
                        "index": 0,
                        "message": { "role": "assistant", "content": "¡Hola! ¿En qué te ayudo?" }
                    }
                ]
            }));
        })
        .await;

    let client = OpenRouterClient::new(&config_for(&server))?;
    let answer = client
        .complete(&[
            ChatMessage::system("Eres un asistente útil. Responde en español."),
            ChatMessage::user("Hola, ¿puedes saludarme?"),
        ])
        .await?;

    mock.assert_async().await;
    assert_eq!(answer, "¡Hola! ¿En qué te ayudo?");
    Ok(())
}

#[tokio::test]
async fn non_success_status_is_api_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/chat/completions");
            then.status(401).body(r#"{"error":{"message":"No auth credentials found"}}"#);
        })
        .await;

    let client = OpenRouterClient::new(&config_for(&server))?;
    let err = client.complete(&[ChatMessage::user("Hola")]).await.unwrap_err();

    match err {
        BotError::Api { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("No auth credentials found"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn empty_choices_is_missing_field() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        })
        .await;

    let client = OpenRouterClient::new(&config_for(&server))?;
    let err = client.complete(&[ChatMessage::user("Hola")]).await.unwrap_err();
    assert!(matches!(err, BotError::MissingField(_)));
    Ok(())
}

#[test]
fn placeholder_key_is_rejected() {
    let config = OpenRouterConfig {
        api_key: Some("sk-or-v1-a56...if7".to_string()),
        ..OpenRouterConfig::default()
    };
    assert!(matches!(OpenRouterClient::new(&config), Err(BotError::Config(_))));
}

#[tokio::test]
async fn reply_service_uses_model_answer_end_to_end() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/chat/completions")
                .body_contains("Costo inscripción: $5,000 MXN");
            then.status(200).json_body(json!({
                "choices": [ { "message": { "content": "La inscripción cuesta $5,000 MXN." } } ]
            }));
        })
        .await;

    let client = OpenRouterClient::new(&config_for(&server))?;
    let service = ReplyService::new(
        BusinessProfile::default(),
        Some(Arc::new(client) as Arc<dyn ChatCompletionPort>),
    );
    let message = IncomingMessage {
        from: "whatsapp:+5215512345678".to_string(),
        body: "¿Cuánto cuesta la inscripción?".to_string(),
        ..Default::default()
    };

    let (text, source) = service.reply_with_source(&message).await;
    assert_eq!(source, ReplySource::Model);
    assert_eq!(text, "La inscripción cuesta $5,000 MXN.");
    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_falls_back() -> Result<()> {
    let config = OpenRouterConfig {
        api_key: Some("sk-or-v1-test".to_string()),
        api_url: "http://127.0.0.1:9/api/v1/chat/completions".to_string(),
        timeout_seconds: 2,
        ..OpenRouterConfig::default()
    };
    let client = OpenRouterClient::new(&config)?;
    let service = ReplyService::new(
        BusinessProfile::default(),
        Some(Arc::new(client) as Arc<dyn ChatCompletionPort>),
    );
    let message = IncomingMessage { body: "Hola".to_string(), ..Default::default() };

    let (text, source) = service.reply_with_source(&message).await;
    assert_eq!(source, ReplySource::Fallback);
    assert_eq!(text, "Te ayudo a agendar una cita.");
    Ok(())
}
