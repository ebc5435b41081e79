use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored source text. `content_hash` is unique: a given text body maps to
/// at most one row, created on first save and never deleted by this service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OriginalContentRow {
    pub id: Uuid,
    pub content: String,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted variant. Many outputs reference one original (1:N); rows are
/// immutable once inserted and no delete path is exposed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RemixOutputRow {
    pub id: Uuid,
    pub original_content_id: Uuid,
    pub remix_type: String,
    pub remixed_content: String,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// One remix output joined with its parent original content's text and
/// creation time, for the global recent-activity view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedRemixRow {
    pub id: Uuid,
    pub original_content_id: Uuid,
    pub remix_type: String,
    pub remixed_content: String,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub original_content: String,
    pub original_created_at: DateTime<Utc>,
}
