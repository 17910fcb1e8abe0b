//! Live-stream event source abstraction
//!
//! The platform connection is an external collaborator; the engine only
//! needs a stream of `LiveEvent`s for a named broadcast room. `EventSource`
//! is the seam for platform-specific implementations, and `SourceManager`
//! owns at most one attached source at a time.
//!
//! Switching rooms must fully detach the previous source before the new one
//! attaches: the manager aborts the old forwarding task *and* advances the
//! engine's accepted generation, so an event from a superseded source that
//! is already queued can never mutate a new session.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use types::events::LiveEvent;

use crate::engine::{EngineError, EngineHandle};

/// Errors from a source implementation.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("failed to connect to room {room_id}: {message}")]
    Connect { room_id: String, message: String },

    #[error("stream error: {0}")]
    Stream(String),

    #[error("disconnect failed: {0}")]
    Disconnect(String),
}

/// Connection handle for an active source stream.
#[derive(Debug)]
pub struct SourceConnection {
    /// Broadcast room being followed.
    pub room_id: String,
    /// Whether the connection is live.
    pub is_connected: bool,
    /// Connection start time.
    pub connected_at: DateTime<Utc>,
}

impl SourceConnection {
    /// Create a connected handle for a room.
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            is_connected: true,
            connected_at: Utc::now(),
        }
    }
}

/// Trait for platform-specific live event sources.
#[async_trait]
pub trait EventSource: Send + Sync + 'static {
    /// Connect to the event stream for a room.
    async fn connect(&self, room_id: &str) -> Result<SourceConnection, SourceError>;

    /// Receive the next event. Returns `None` when the stream has ended.
    async fn next_event(
        &self,
        connection: &mut SourceConnection,
    ) -> Result<Option<LiveEvent>, SourceError>;

    /// Disconnect from the stream.
    async fn disconnect(&self, connection: &mut SourceConnection) -> Result<(), SourceError>;
}

struct AttachedSource {
    room_id: String,
    task: JoinHandle<()>,
}

/// Owns the single active source attachment and its forwarding task.
pub struct SourceManager {
    source: Arc<dyn EventSource>,
    engine: EngineHandle,
    current: Option<AttachedSource>,
    /// Bumped on every attach; stamps all forwarded events.
    generation: u64,
}

impl SourceManager {
    pub fn new(source: Arc<dyn EventSource>, engine: EngineHandle) -> Self {
        Self {
            source,
            engine,
            current: None,
            generation: 0,
        }
    }

    /// Room currently being followed, if any.
    pub fn room_id(&self) -> Option<&str> {
        self.current.as_ref().map(|a| a.room_id.as_str())
    }

    /// Current source generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Follow a new room. Detaches any previous source first; idempotent to
    /// retry with the same room id (the connection is simply re-established).
    pub async fn attach(&mut self, room_id: &str) -> Result<(), EngineError> {
        self.detach().await;

        self.generation += 1;
        let generation = self.generation;
        self.engine.accept_generation(generation).await?;

        info!(room_id, generation, "attaching event source");

        let task = tokio::spawn(forward_events(
            Arc::clone(&self.source),
            self.engine.clone(),
            room_id.to_string(),
            generation,
        ));

        self.current = Some(AttachedSource {
            room_id: room_id.to_string(),
            task,
        });
        Ok(())
    }

    /// Stop following the current room, if any. Best-effort: a task that
    /// fails to wind down cleanly is logged, never fatal.
    pub async fn detach(&mut self) {
        if let Some(attached) = self.current.take() {
            info!(room_id = %attached.room_id, "detaching event source");
            attached.task.abort();
            if let Err(e) = attached.task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "source task ended abnormally during detach");
                }
            }
        }
    }
}

/// Forwarding loop: connect, report status, then pump events into the
/// engine until the stream ends or the attachment is superseded.
async fn forward_events(
    source: Arc<dyn EventSource>,
    engine: EngineHandle,
    room_id: String,
    generation: u64,
) {
    let mut connection = match source.connect(&room_id).await {
        Ok(connection) => {
            info!(
                room_id,
                connected_at = %connection.connected_at,
                "source connected"
            );
            let _ = engine
                .submit_event(
                    generation,
                    LiveEvent::SourceStatus {
                        connected: true,
                        room_id: Some(room_id.clone()),
                        error: None,
                    },
                )
                .await;
            connection
        }
        Err(e) => {
            warn!(room_id, error = %e, "source connection failed");
            let _ = engine
                .submit_event(
                    generation,
                    LiveEvent::SourceStatus {
                        connected: false,
                        room_id: Some(room_id.clone()),
                        error: Some(e.to_string()),
                    },
                )
                .await;
            return;
        }
    };

    loop {
        match source.next_event(&mut connection).await {
            Ok(Some(event)) => {
                if engine.submit_event(generation, event).await.is_err() {
                    // Engine shut down; nothing left to forward to.
                    break;
                }
            }
            Ok(None) => {
                info!(room_id, "source stream ended");
                let _ = engine
                    .submit_event(
                        generation,
                        LiveEvent::SourceStatus {
                            connected: false,
                            room_id: Some(room_id.clone()),
                            error: None,
                        },
                    )
                    .await;
                break;
            }
            Err(e) => {
                warn!(room_id, error = %e, "source stream error");
                let _ = engine
                    .submit_event(
                        generation,
                        LiveEvent::SourceStatus {
                            connected: false,
                            room_id: Some(room_id.clone()),
                            error: Some(e.to_string()),
                        },
                    )
                    .await;
                break;
            }
        }
    }

    if let Err(e) = source.disconnect(&mut connection).await {
        warn!(room_id, error = %e, "source disconnect failed");
    }
}
