use std::sync::Arc;

use game_engine::{EngineHandle, SourceManager};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    /// Handle into the aggregation engine task.
    pub engine: EngineHandle,
    /// Single source attachment, shared across client connections. The lock
    /// only guards attach/detach, never the event path.
    pub sources: Arc<Mutex<SourceManager>>,
}

impl AppState {
    pub fn new(engine: EngineHandle, sources: SourceManager) -> Self {
        Self {
            engine,
            sources: Arc::new(Mutex::new(sources)),
        }
    }
}
