//! Metrics for the WhatsApp assistant
//!
//! Recording functions are grouped by the part of the request path they observe.
//! Without an installed recorder every call is a no-op, so tests never need one.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use tracing::info;

/// All metric names used by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    WebhookMessages,
    WebhookErrors,
    LlmRequests,
    LlmRequestDuration,
    Replies,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::WebhookMessages => "wa_webhook_messages_total",
            MetricName::WebhookErrors => "wa_webhook_errors_total",
            MetricName::LlmRequests => "wa_llm_requests_total",
            MetricName::LlmRequestDuration => "wa_llm_request_duration_seconds",
            MetricName::Replies => "wa_replies_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            WebhookMessages,
            WebhookErrors,
            LlmRequests,
            LlmRequestDuration,
            Replies,
        ]
        .into_iter()
    }

    /// Description registered with the exporter
    pub fn description(&self) -> &'static str {
        match self {
            MetricName::WebhookMessages => "Inbound WhatsApp messages accepted by the webhook",
            MetricName::WebhookErrors => "Webhook requests whose form could not be read",
            MetricName::LlmRequests => "Chat completion requests by outcome",
            MetricName::LlmRequestDuration => "Chat completion latency",
            MetricName::Replies => "Replies sent by source (model, fallback, placeholder)",
        }
    }
}

/// Install the Prometheus recorder and return the handle used by `/metrics`.
pub fn init() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;

    for name in MetricName::all_metrics() {
        match name {
            MetricName::LlmRequestDuration => {
                ::metrics::describe_histogram!(
                    name.as_str(),
                    ::metrics::Unit::Seconds,
                    name.description()
                );
            }
            _ => {
                ::metrics::describe_counter!(name.as_str(), name.description());
            }
        }
    }

    info!("Metrics system initialized");
    Ok(handle)
}

pub mod webhook {
    use super::MetricName;

    pub fn message_received() {
        ::metrics::counter!(MetricName::WebhookMessages.as_str()).increment(1);
    }

    pub fn request_error() {
        ::metrics::counter!(MetricName::WebhookErrors.as_str()).increment(1);
    }
}

pub mod llm {
    use super::MetricName;

    pub fn request_success(secs: f64) {
        ::metrics::counter!(MetricName::LlmRequests.as_str(), "outcome" => "success").increment(1);
        ::metrics::histogram!(MetricName::LlmRequestDuration.as_str()).record(secs);
    }

    pub fn request_error(secs: f64) {
        ::metrics::counter!(MetricName::LlmRequests.as_str(), "outcome" => "error").increment(1);
        ::metrics::histogram!(MetricName::LlmRequestDuration.as_str()).record(secs);
    }
}

pub mod replies {
    use super::MetricName;
    use crate::types::ReplySource;

    pub fn sent(source: ReplySource) {
        ::metrics::counter!(MetricName::Replies.as_str(), "source" => source.as_str()).increment(1);
    }
}
