//! Event source implementations available to this binary.
//!
//! A real deployment links a platform connector crate here. The gateway
//! itself ships with `IdleSource`, which establishes the attachment (so the
//! control surface and status reporting work end to end) but produces no
//! events until a connector replaces it.

use async_trait::async_trait;
use game_engine::{EventSource, SourceConnection, SourceError};
use types::events::LiveEvent;

/// A source that connects successfully and then stays silent.
pub struct IdleSource;

#[async_trait]
impl EventSource for IdleSource {
    async fn connect(&self, room_id: &str) -> Result<SourceConnection, SourceError> {
        Ok(SourceConnection::new(room_id))
    }

    async fn next_event(
        &self,
        _connection: &mut SourceConnection,
    ) -> Result<Option<LiveEvent>, SourceError> {
        // No platform connector wired in; park until detached.
        std::future::pending::<()>().await;
        unreachable!()
    }

    async fn disconnect(&self, connection: &mut SourceConnection) -> Result<(), SourceError> {
        connection.is_connected = false;
        Ok(())
    }
}
