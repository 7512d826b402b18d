use axum::extract::FromRequestParts;
use uuid::Uuid;

use crate::error::AppError;

pub const SESSION_HEADER: &str = "x-session-id";

/// The customer's browser session, identified by a client-generated UUID
/// sent in `x-session-id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerSession(pub Uuid);

impl CustomerSession {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl<S> FromRequestParts<S> for CustomerSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .ok_or_else(|| AppError::BadRequest(format!("Missing {SESSION_HEADER} header")))?
            .to_str()
            .map_err(|_| AppError::BadRequest(format!("Invalid {SESSION_HEADER} header")))?;

        Uuid::parse_str(raw.trim())
            .map(CustomerSession)
            .map_err(|_| AppError::BadRequest(format!("{SESSION_HEADER} must be a UUID")))
    }
}
