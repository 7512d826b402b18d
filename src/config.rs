use std::env;

use anyhow::Context;

pub const DEFAULT_EMAILJS_API_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

#[derive(Debug, Clone)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub order_feed_capacity: usize,
    pub emailjs: Option<EmailJsConfig>,
    pub staff_email: Option<String>,
    pub staff_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = non_empty("DATABASE_URL");
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let order_feed_capacity = env::var("ORDER_FEED_CAPACITY")
            .ok()
            .and_then(|c| c.parse::<usize>().ok())
            .unwrap_or(256);

        let emailjs = match (
            non_empty("EMAILJS_SERVICE_ID"),
            non_empty("EMAILJS_TEMPLATE_ID"),
            non_empty("EMAILJS_PUBLIC_KEY"),
        ) {
            (Some(service_id), Some(template_id), Some(public_key)) => Some(EmailJsConfig {
                service_id,
                template_id,
                public_key,
                api_url: non_empty("EMAILJS_API_URL")
                    .unwrap_or_else(|| DEFAULT_EMAILJS_API_URL.to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            order_feed_capacity,
            emailjs,
            staff_email: non_empty("STAFF_EMAIL"),
            staff_password: non_empty("STAFF_PASSWORD"),
        })
    }

    /// In-memory setup with no email provider, used by tests and local runs.
    pub fn local(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: jwt_secret.into(),
            order_feed_capacity: 256,
            emailjs: None,
            staff_email: None,
            staff_password: None,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
