use std::path::PathBuf;
use std::sync::Arc;

use crate::storage::Store;
use crate::update::UpdateCycle;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub cycle: Arc<UpdateCycle>,
    /// Onboarding manifest read by the seed endpoints
    pub manifest_path: Arc<PathBuf>,
    pub cors_origin: Arc<str>,
}

impl AppState {
    pub fn new(cycle: Arc<UpdateCycle>, manifest_path: PathBuf) -> Self {
        Self {
            store: Arc::clone(cycle.store()),
            cycle,
            manifest_path: Arc::new(manifest_path),
            cors_origin: Arc::from("*"),
        }
    }

    pub fn with_cors_origin(mut self, origin: &str) -> Self {
        self.cors_origin = Arc::from(origin);
        self
    }
}
