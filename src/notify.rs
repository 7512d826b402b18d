//! Outbound order notification for the email ordering flow.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::{AppConfig, EmailJsConfig};

#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("email provider unreachable: {0}")]
    Transport(String),

    #[error("email provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Flat template parameters, one string per template placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EmailTemplateParams {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub order_items: String,
    pub order_total: String,
    pub order_notes: String,
    pub order_time: String,
}

#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn send_order(&self, params: &EmailTemplateParams) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct EmailJsRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a EmailTemplateParams,
}

pub struct EmailJsNotifier {
    client: reqwest::Client,
    config: EmailJsConfig,
}

impl EmailJsNotifier {
    pub fn new(config: EmailJsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl OrderNotifier for EmailJsNotifier {
    async fn send_order(&self, params: &EmailTemplateParams) -> Result<(), NotifyError> {
        let request = EmailJsRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            template_params: params,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        tracing::info!(customer = %params.customer_name, "order email sent");
        Ok(())
    }
}

/// Used when no provider is configured: logs the order and reports success.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn send_order(&self, params: &EmailTemplateParams) -> Result<(), NotifyError> {
        tracing::warn!(
            customer = %params.customer_name,
            total = %params.order_total,
            items = %params.order_items,
            "email provider not configured, order only logged"
        );
        Ok(())
    }
}

pub fn notifier_from_config(config: &AppConfig) -> Arc<dyn OrderNotifier> {
    match &config.emailjs {
        Some(emailjs) => Arc::new(EmailJsNotifier::new(emailjs.clone())),
        None => Arc::new(LogNotifier),
    }
}
