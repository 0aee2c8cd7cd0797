use std::sync::Arc;

use crate::config::ServerConfig;
use crate::store::MilestoneStore;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`. Cheaply cloneable; inner data is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Milestone store (persistence boundary for the engine).
    pub store: Arc<MilestoneStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
