//! Shared runtime state for dls-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The store is held as
//! `Arc<dyn Store>` so tests can swap in the in-memory backend.

use std::sync::Arc;

use dls_db::Store;
use serde::{Deserialize, Serialize};

/// Static build metadata included in the health response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub build: BuildInfo,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            build: BuildInfo {
                service: "dls-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}
