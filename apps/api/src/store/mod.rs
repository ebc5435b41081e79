//! Persistence gateway over the hosted content store.
//!
//! Every operation degrades instead of raising: an unconfigured store yields
//! `StoreOutcome::Unavailable`, and a store-level error is logged and mapped
//! to an empty sentinel (`None` or an empty list). Callers treat both as
//! normal outcomes and surface them to the user only on explicit save.

use serde_json::Value;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::hashing::content_hash;
use crate::models::content::{OriginalContentRow, RemixOutputRow, SavedRemixRow};
use crate::models::preferences::{TagRow, UserPreferencesRow};

/// Result of a gateway call. `Unavailable` (no store configured) is distinct
/// from an `Ok` empty sentinel (the store answered, possibly after a logged
/// error), so callers can tell "no store" from "store has no rows".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome<T> {
    Ok(T),
    Unavailable,
}

impl<T> StoreOutcome<T> {
    /// Unwraps an available value, mapping `Unavailable` to `None`.
    #[allow(dead_code)]
    pub fn available(self) -> Option<T> {
        match self {
            StoreOutcome::Ok(v) => Some(v),
            StoreOutcome::Unavailable => None,
        }
    }
}

/// Gateway to the four content tables. Holds no pool when the store is not
/// configured, in which case every call reports `Unavailable`.
#[derive(Clone)]
pub struct ContentStore {
    pool: Option<PgPool>,
}

impl ContentStore {
    pub fn new(pool: Option<PgPool>) -> Self {
        Self { pool }
    }

    pub fn is_available(&self) -> bool {
        self.pool.is_some()
    }

    /// Saves original content deduplicated by hash: repeated saves of the
    /// identical text return the existing row instead of inserting another.
    pub async fn save_original_content(
        &self,
        content: &str,
    ) -> StoreOutcome<Option<OriginalContentRow>> {
        let Some(pool) = &self.pool else {
            return StoreOutcome::Unavailable;
        };

        let hash = content_hash(content);

        match sqlx::query_as::<_, OriginalContentRow>(
            "SELECT * FROM original_content WHERE content_hash = $1",
        )
        .bind(&hash)
        .fetch_optional(pool)
        .await
        {
            Ok(Some(existing)) => return StoreOutcome::Ok(Some(existing)),
            Ok(None) => {}
            Err(e) => {
                error!("Error looking up original content by hash: {e}");
                return StoreOutcome::Ok(None);
            }
        }

        let inserted = sqlx::query_as::<_, OriginalContentRow>(
            r#"
            INSERT INTO original_content (id, content, content_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(content)
        .bind(&hash)
        .fetch_one(pool)
        .await;

        match inserted {
            Ok(row) => StoreOutcome::Ok(Some(row)),
            Err(e) => {
                error!("Error saving original content: {e}");
                StoreOutcome::Ok(None)
            }
        }
    }

    pub async fn get_original_content(
        &self,
        id: Uuid,
    ) -> StoreOutcome<Option<OriginalContentRow>> {
        let Some(pool) = &self.pool else {
            return StoreOutcome::Unavailable;
        };

        match sqlx::query_as::<_, OriginalContentRow>(
            "SELECT * FROM original_content WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        {
            Ok(row) => StoreOutcome::Ok(row),
            Err(e) => {
                error!("Error fetching original content: {e}");
                StoreOutcome::Ok(None)
            }
        }
    }

    /// Unconditional insert — saving the same variant twice creates two rows.
    pub async fn save_remix_output(
        &self,
        original_content_id: Uuid,
        remix_type: &str,
        remixed_content: &str,
        metadata: Option<&Value>,
    ) -> StoreOutcome<Option<RemixOutputRow>> {
        let Some(pool) = &self.pool else {
            return StoreOutcome::Unavailable;
        };

        let inserted = sqlx::query_as::<_, RemixOutputRow>(
            r#"
            INSERT INTO remix_outputs (id, original_content_id, remix_type, remixed_content, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(original_content_id)
        .bind(remix_type)
        .bind(remixed_content)
        .bind(metadata)
        .fetch_one(pool)
        .await;

        match inserted {
            Ok(row) => StoreOutcome::Ok(Some(row)),
            Err(e) => {
                error!("Error saving remix output: {e}");
                StoreOutcome::Ok(None)
            }
        }
    }

    /// Outputs for one original, newest first.
    pub async fn get_remix_outputs(
        &self,
        original_content_id: Uuid,
    ) -> StoreOutcome<Vec<RemixOutputRow>> {
        let Some(pool) = &self.pool else {
            return StoreOutcome::Unavailable;
        };

        match sqlx::query_as::<_, RemixOutputRow>(
            "SELECT * FROM remix_outputs WHERE original_content_id = $1 ORDER BY created_at DESC",
        )
        .bind(original_content_id)
        .fetch_all(pool)
        .await
        {
            Ok(rows) => StoreOutcome::Ok(rows),
            Err(e) => {
                error!("Error fetching remix outputs: {e}");
                StoreOutcome::Ok(Vec::new())
            }
        }
    }

    /// All remix outputs newest first, each joined with its parent original
    /// content's text and creation time.
    pub async fn get_all_remix_outputs(&self) -> StoreOutcome<Vec<SavedRemixRow>> {
        let Some(pool) = &self.pool else {
            return StoreOutcome::Unavailable;
        };

        match sqlx::query_as::<_, SavedRemixRow>(
            r#"
            SELECT r.id, r.original_content_id, r.remix_type, r.remixed_content,
                   r.metadata, r.created_at,
                   o.content AS original_content, o.created_at AS original_created_at
            FROM remix_outputs r
            JOIN original_content o ON o.id = r.original_content_id
            ORDER BY r.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
        {
            Ok(rows) => StoreOutcome::Ok(rows),
            Err(e) => {
                error!("Error fetching all remix outputs: {e}");
                StoreOutcome::Ok(Vec::new())
            }
        }
    }

    /// Upsert keyed on user identity. NULL is the anonymous bucket; the
    /// unique index is declared NULLS NOT DISTINCT so it holds there too.
    pub async fn save_user_preferences(
        &self,
        user_id: Option<Uuid>,
        favorite_remix_types: &[String],
        default_settings: Option<&Value>,
    ) -> StoreOutcome<Option<UserPreferencesRow>> {
        let Some(pool) = &self.pool else {
            return StoreOutcome::Unavailable;
        };

        let upserted = sqlx::query_as::<_, UserPreferencesRow>(
            r#"
            INSERT INTO user_preferences (id, user_id, favorite_remix_types, default_settings)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET favorite_remix_types = EXCLUDED.favorite_remix_types,
                default_settings = EXCLUDED.default_settings,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(favorite_remix_types)
        .bind(default_settings)
        .fetch_one(pool)
        .await;

        match upserted {
            Ok(row) => StoreOutcome::Ok(Some(row)),
            Err(e) => {
                error!("Error saving user preferences: {e}");
                StoreOutcome::Ok(None)
            }
        }
    }

    pub async fn get_user_preferences(
        &self,
        user_id: Option<Uuid>,
    ) -> StoreOutcome<Option<UserPreferencesRow>> {
        let Some(pool) = &self.pool else {
            return StoreOutcome::Unavailable;
        };

        match sqlx::query_as::<_, UserPreferencesRow>(
            "SELECT * FROM user_preferences WHERE user_id IS NOT DISTINCT FROM $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        {
            Ok(row) => StoreOutcome::Ok(row),
            Err(e) => {
                error!("Error fetching user preferences: {e}");
                StoreOutcome::Ok(None)
            }
        }
    }

    /// Extension point: tags have no caller in the workflow yet.
    #[allow(dead_code)]
    pub async fn create_tag(&self, name: &str) -> StoreOutcome<Option<TagRow>> {
        let Some(pool) = &self.pool else {
            return StoreOutcome::Unavailable;
        };

        let inserted =
            sqlx::query_as::<_, TagRow>("INSERT INTO tags (id, name) VALUES ($1, $2) RETURNING *")
                .bind(Uuid::new_v4())
                .bind(name)
                .fetch_one(pool)
                .await;

        match inserted {
            Ok(row) => StoreOutcome::Ok(Some(row)),
            Err(e) => {
                error!("Error creating tag: {e}");
                StoreOutcome::Ok(None)
            }
        }
    }

    /// Extension point: tags have no caller in the workflow yet.
    #[allow(dead_code)]
    pub async fn get_all_tags(&self) -> StoreOutcome<Vec<TagRow>> {
        let Some(pool) = &self.pool else {
            return StoreOutcome::Unavailable;
        };

        match sqlx::query_as::<_, TagRow>("SELECT * FROM tags ORDER BY name")
            .fetch_all(pool)
            .await
        {
            Ok(rows) => StoreOutcome::Ok(rows),
            Err(e) => {
                error!("Error fetching tags: {e}");
                StoreOutcome::Ok(Vec::new())
            }
        }
    }
}
