use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::settings::AppConfig;
use crate::infrastructure::db::pool::Database;
use crate::infrastructure::media::Fragmenter;
use crate::infrastructure::storage::ObjectStorage;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub storage: Arc<dyn ObjectStorage>,
    pub fragmenter: Arc<dyn Fragmenter>,
    /// Cancelled on shutdown; in-flight jobs stop at their next step.
    pub shutdown: CancellationToken,
    /// Background job runs, awaited before the pool is closed.
    pub tasks: TaskTracker,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: Database,
        storage: Arc<dyn ObjectStorage>,
        fragmenter: Arc<dyn Fragmenter>,
    ) -> Self {
        Self {
            config,
            db,
            storage,
            fragmenter,
            shutdown: CancellationToken::new(),
            tasks: TaskTracker::new(),
        }
    }
}
