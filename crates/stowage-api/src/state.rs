//! Application state.
//!
//! Every external store is held behind its trait so the same router runs
//! against Postgres or the in-memory stores.

use std::sync::Arc;
use stowage_core::Config;
use stowage_db::{MetadataStore, SessionStore, UserStore};
use stowage_storage::Storage;

use crate::services::files::FileService;

/// Credentials and sessions backing `/users`, `/connect`, `/disconnect` and
/// the `X-Token` middleware.
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub session_ttl: chrono::Duration,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub files: FileService,
    pub auth: AuthState,
    /// Held directly for status and stats checks.
    pub metadata: Arc<dyn MetadataStore>,
    pub storage: Arc<dyn Storage>,
}
