use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::{error::AppResult, models::AuditEntry, store::Store};

pub async fn log_audit(
    store: &dyn Store,
    user_id: Option<Uuid>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    store
        .append_audit(AuditEntry {
            id: Uuid::new_v4(),
            user_id,
            action: action.to_string(),
            resource: resource.map(str::to_string),
            metadata,
            created_at: Utc::now(),
        })
        .await?;

    Ok(())
}
