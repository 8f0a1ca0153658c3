use std::sync::Arc;

use crate::enhancement::session::SessionStore;
use crate::llm_client::GenerativeModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The generative model behind every enhancement. `GeminiClient` in
    /// production; swapped for a stub under test.
    pub model: Arc<dyn GenerativeModel>,
    pub sessions: SessionStore,
}
