use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user settings. At most one row per `user_id`, where NULL is the
/// anonymous bucket; enforced by upsert-on-conflict semantics.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserPreferencesRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub favorite_remix_types: Vec<String>,
    pub default_settings: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Free-standing label. Stored and listable, but nothing in the workflow
/// wires tags to content yet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TagRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
