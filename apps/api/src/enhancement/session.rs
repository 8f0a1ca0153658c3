//! Per-session orchestration around `enhance_sentence`.
//!
//! One `EnhancementSession` per UI session. Sessions never share mutable
//! state, so calls from independent sessions are unconstrained. Within a
//! session two guards hold:
//!
//! - single-flight: a second submission while one is outstanding fails `Busy`
//! - generation counter: a result is committed only if no newer request (or
//!   band change) was issued while it was in flight; otherwise the call
//!   finishes as `Superseded` and the result is dropped

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::enhancement::band::Band;
use crate::enhancement::enhancer::{enhance_sentence, EnhanceError, EnhancementResult};
use crate::llm_client::GenerativeModel;

/// Collaborator state owned by the session. The enhancement core reads only
/// `target_band` from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub photo: Option<String>,
    pub target_band: Band,
}

pub struct EnhancementSession {
    model: Arc<dyn GenerativeModel>,
    profile: RwLock<UserProfile>,
    /// Bumped on every accepted request and on band changes; a completed call
    /// commits its result only if its token is still the current generation.
    generation: AtomicU64,
    in_flight: AtomicBool,
    latest: Mutex<Option<EnhancementResult>>,
}

/// Clears the in-flight flag on every exit path.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EnhancementSession {
    pub fn new(model: Arc<dyn GenerativeModel>, profile: UserProfile) -> Self {
        Self {
            model,
            profile: RwLock::new(profile),
            generation: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
            latest: Mutex::new(None),
        }
    }

    pub async fn profile(&self) -> UserProfile {
        self.profile.read().await.clone()
    }

    pub async fn target_band(&self) -> Band {
        self.profile.read().await.target_band
    }

    /// Whether an enhancement is currently outstanding. Callers use this the
    /// way the UI uses a disabled submit button.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn latest(&self) -> Option<EnhancementResult> {
        self.latest.lock().await.clone()
    }

    /// Changes the target band, invalidating any outstanding call and
    /// clearing the previous result so the next one is calibrated fresh.
    pub async fn set_target_band(&self, band: Band) {
        self.profile.write().await.target_band = band;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.latest.lock().await.take();
    }

    /// Runs one enhancement against the session's current target band.
    ///
    /// Fails `Busy` if a call is already outstanding. If the session's
    /// generation moved while the call was in flight, the result is dropped
    /// and the call fails `Superseded`.
    pub async fn enhance(&self, source_text: &str) -> Result<EnhancementResult, EnhanceError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(EnhanceError::Busy);
        }
        let _guard = FlightGuard(&self.in_flight);

        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let band = self.target_band().await;

        let result = enhance_sentence(self.model.as_ref(), source_text, band.value()).await?;

        if self.generation.load(Ordering::SeqCst) != token {
            return Err(EnhanceError::Superseded);
        }
        *self.latest.lock().await = Some(result.clone());
        Ok(result)
    }
}

/// In-memory registry of live sessions. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Arc<EnhancementSession>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: EnhancementSession) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.write().await.insert(id, Arc::new(session));
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<EnhancementSession>> {
        self.inner.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
