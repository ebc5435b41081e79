use std::sync::Arc;

use tokio::sync::Mutex;

use crate::remix::RemixClient;
use crate::store::ContentStore;
use crate::workflow::Workflow;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: ContentStore,
    pub remix: RemixClient,
    /// The single remix session. The lock serializes all state-machine
    /// mutations, the way the browser event loop serialized the original.
    pub workflow: Arc<Mutex<Workflow>>,
}
