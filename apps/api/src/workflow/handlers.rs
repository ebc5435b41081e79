//! Axum route handlers for the remix workflow.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::preferences::UserPreferencesRow;
use crate::state::AppState;
use crate::store::StoreOutcome;
use crate::workflow::{share, Phase, SaveTicket, SavedList, VariantCard};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RemixRequest {
    pub content: String,
    pub styles: Vec<String>,
}

/// The session as rendered: every card including hidden ones, each tagged
/// with its state, so client indices stay stable across soft deletes. The
/// saved-posts sidebar rides along as its own independent piece of state.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub phase: Phase,
    pub variants: Vec<VariantCard>,
    pub saved: SavedList,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub saved: bool,
    pub already_saved: bool,
}

#[derive(Debug, Deserialize)]
pub struct ShareQuery {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub share_url: String,
}

#[derive(Debug, Deserialize)]
pub struct PreferencesQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub user_id: Option<Uuid>,
    pub favorite_remix_types: Vec<String>,
    pub default_settings: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub available: bool,
    pub preferences: Option<UserPreferencesRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/remix
///
/// Generates one variant per requested style and replaces the session batch.
/// Rejected with 409 while a generation is in flight and with 400 for empty
/// input; a missing LLM key is a blocking configuration error.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<RemixRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    if request.styles.is_empty() {
        return Err(AppError::Validation("styles cannot be empty".to_string()));
    }

    {
        let mut workflow = state.workflow.lock().await;
        workflow.begin_generation(&request.content)?;
    }

    // The generation runs in its own task, not in this handler future: axum
    // drops handler futures on client disconnect, and the session must still
    // leave the Generating phase. The lock is not held across the provider
    // calls; a re-trigger is rejected by the phase guard instead.
    let task_state = state.clone();
    let RemixRequest { content, styles } = request;
    let generation = tokio::spawn(async move {
        let generated = task_state.remix.generate_variants(&content, &styles).await;
        let mut workflow = task_state.workflow.lock().await;
        match generated {
            Ok(results) => {
                workflow.complete_generation(results);
                Ok(())
            }
            Err(e) => {
                workflow.abort_generation();
                Err(e)
            }
        }
    });

    match generation.await {
        Ok(Ok(())) => {
            let workflow = state.workflow.lock().await;
            Ok(Json(SessionResponse {
                phase: workflow.phase(),
                variants: workflow.cards().to_vec(),
                saved: workflow.saved_posts().clone(),
            }))
        }
        Ok(Err(e)) => Err(AppError::NotConfigured(e.to_string())),
        Err(e) => {
            state.workflow.lock().await.abort_generation();
            Err(AppError::Internal(anyhow::anyhow!(
                "generation task failed: {e}"
            )))
        }
    }
}

/// GET /api/v1/remix
pub async fn handle_get_session(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, AppError> {
    let workflow = state.workflow.lock().await;
    Ok(Json(SessionResponse {
        phase: workflow.phase(),
        variants: workflow.cards().to_vec(),
        saved: workflow.saved_posts().clone(),
    }))
}

/// POST /api/v1/remix/:index/save
///
/// Persists one variant: save original (hash-deduplicated), then save the
/// remix output. Idempotent at the session level — saving an already-saved
/// card issues no persistence calls. Store failures surface here as explicit
/// errors, unlike read paths which degrade silently.
pub async fn handle_save(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SaveResponse>, AppError> {
    let ticket = {
        let mut workflow = state.workflow.lock().await;
        workflow.begin_save(index)?
    };

    let (original_text, style, content, metadata) = match ticket {
        SaveTicket::AlreadySaved => {
            return Ok(Json(SaveResponse {
                saved: true,
                already_saved: true,
            }))
        }
        SaveTicket::Proceed {
            original_text,
            style,
            content,
            metadata,
        } => (original_text, style, content, metadata),
    };

    let persisted = persist_variant(&state, &original_text, &style, &content, &metadata).await;

    state
        .workflow
        .lock()
        .await
        .finish_save(index, persisted.is_ok());

    persisted?;
    refresh_saved_list(&state).await;

    Ok(Json(SaveResponse {
        saved: true,
        already_saved: false,
    }))
}

/// POST /api/v1/remix/:index/hide
///
/// Soft delete: the card disappears from the visible list but its data stays.
pub async fn handle_hide(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut workflow = state.workflow.lock().await;
    workflow.hide(index)?;
    Ok(Json(SessionResponse {
        phase: workflow.phase(),
        variants: workflow.cards().to_vec(),
        saved: workflow.saved_posts().clone(),
    }))
}

/// GET /api/v1/saved
///
/// Reloads the full saved-posts list from the store (there is no finer cache
/// invalidation than "reload everything"). Store-unavailable yields an empty
/// list with `available: false` rather than an error.
pub async fn handle_get_saved(State(state): State<AppState>) -> Json<SavedList> {
    Json(refresh_saved_list(&state).await)
}

/// GET /api/v1/share?text=&url=
pub async fn handle_share(Query(query): Query<ShareQuery>) -> Json<ShareResponse> {
    Json(ShareResponse {
        share_url: share::share_url(&query.text, &query.url),
    })
}

/// GET /api/v1/preferences?user_id=
///
/// A missing `user_id` reads the anonymous bucket.
pub async fn handle_get_preferences(
    State(state): State<AppState>,
    Query(query): Query<PreferencesQuery>,
) -> Json<PreferencesResponse> {
    match state.store.get_user_preferences(query.user_id).await {
        StoreOutcome::Ok(preferences) => Json(PreferencesResponse {
            available: true,
            preferences,
        }),
        StoreOutcome::Unavailable => Json(PreferencesResponse {
            available: false,
            preferences: None,
        }),
    }
}

/// PUT /api/v1/preferences
///
/// Upsert keyed on user identity; like save, this explicit write surfaces
/// store failures instead of degrading silently.
pub async fn handle_put_preferences(
    State(state): State<AppState>,
    Json(request): Json<PreferencesRequest>,
) -> Result<Json<UserPreferencesRow>, AppError> {
    let outcome = state
        .store
        .save_user_preferences(
            request.user_id,
            &request.favorite_remix_types,
            request.default_settings.as_ref(),
        )
        .await;

    match outcome {
        StoreOutcome::Unavailable => Err(AppError::StoreUnavailable),
        StoreOutcome::Ok(None) => Err(AppError::Save(
            "could not save user preferences".to_string(),
        )),
        StoreOutcome::Ok(Some(row)) => Ok(Json(row)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internals
// ────────────────────────────────────────────────────────────────────────────

/// Two independent round trips, no transaction: an orphan original-content
/// row is an accepted outcome when the second insert fails.
async fn persist_variant(
    state: &AppState,
    original_text: &str,
    style: &str,
    content: &str,
    metadata: &Value,
) -> Result<(), AppError> {
    let original = match state.store.save_original_content(original_text).await {
        StoreOutcome::Unavailable => return Err(AppError::StoreUnavailable),
        StoreOutcome::Ok(None) => {
            return Err(AppError::Save("could not save original content".to_string()))
        }
        StoreOutcome::Ok(Some(row)) => row,
    };

    match state
        .store
        .save_remix_output(original.id, style, content, Some(metadata))
        .await
    {
        StoreOutcome::Unavailable => Err(AppError::StoreUnavailable),
        StoreOutcome::Ok(None) => Err(AppError::Save("could not save remix output".to_string())),
        StoreOutcome::Ok(Some(_)) => Ok(()),
    }
}

async fn refresh_saved_list(state: &AppState) -> SavedList {
    let list = match state.store.get_all_remix_outputs().await {
        StoreOutcome::Ok(posts) => SavedList {
            available: true,
            posts,
        },
        StoreOutcome::Unavailable => SavedList::default(),
    };

    state.workflow.lock().await.set_saved_posts(list.clone());
    list
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Mutex;

    use super::*;
    use crate::remix::RemixClient;
    use crate::store::ContentStore;
    use crate::workflow::Workflow;

    fn test_state() -> AppState {
        AppState {
            store: ContentStore::new(None),
            remix: RemixClient::new(
                "http://127.0.0.1:9".to_string(),
                Some("test-key".to_string()),
            ),
            workflow: Arc::new(Mutex::new(Workflow::new())),
        }
    }

    #[tokio::test]
    async fn test_dropped_generate_request_does_not_wedge_the_session() {
        let state = test_state();
        let request = RemixRequest {
            content: "text".to_string(),
            styles: vec!["tips".to_string()],
        };

        // Simulate a client disconnect: poll the handler once, then drop it.
        let fut = handle_generate(State(state.clone()), Json(request));
        let _ = tokio::time::timeout(Duration::from_millis(0), fut).await;

        // The spawned generation still runs to completion and releases the
        // phase even though the handler future is gone.
        for _ in 0..100 {
            if state.workflow.lock().await.phase() != Phase::Generating {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(state.workflow.lock().await.begin_generation("again").is_ok());
    }
}
