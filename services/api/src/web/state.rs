//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::mutation::MutationSerializer;
use crate::web::session::SessionTokens;
use cat_ratings_core::ports::CatStore;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers.
pub struct AppState {
    /// The durable record store. Handlers never keep a collection across
    /// request boundaries; each request loads what it needs.
    pub store: Arc<dyn CatStore>,
    pub config: Arc<Config>,
    /// Per-session anti-forgery tokens.
    pub sessions: SessionTokens,
    /// Serializes every load-mutate-save cycle against the store.
    pub mutations: MutationSerializer,
}
