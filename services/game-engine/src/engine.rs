//! Aggregation engine
//!
//! The single consumer of the live event stream. One tokio task owns the
//! session registry; the event source, the gateway control surface, the
//! per-second lifecycle tick, and the broadcast cadence all feed the same
//! `select!` loop, so every registry mutation is serialized by construction
//! and a snapshot can never observe a team score out of step with its
//! members' points.
//!
//! Outbound fan-out uses `tokio::sync::broadcast`: snapshots are emitted
//! only from the cadence tick (coalescing), while visual events are
//! fire-and-forget and may be lost to a lagging observer without affecting
//! score state.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use types::events::LiveEvent;
use types::ids::ContributorId;
use types::outbound::{OutboundMessage, VisualKind};

use crate::config::SessionConfig;
use crate::lifecycle::{self, SessionPhase, TickOutcome};
use crate::metrics::EngineMetrics;
use crate::registry::{RegisterOutcome, SessionRegistry};
use crate::scoring::{self, GiftTierPolicy};
use crate::teams::TeamResolver;

/// Errors surfaced to engine callers.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine task has shut down")]
    Shutdown,
}

/// Commands accepted by the engine task.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// An event from an attached source, stamped with the source generation
    /// so events from a superseded source can be discarded.
    Event { generation: u64, event: LiveEvent },
    /// Accept events from this generation onward; anything older is stale.
    AcceptGeneration(u64),
    /// Start (or restart) the session.
    StartSession,
}

/// Cloneable handle for submitting commands and subscribing to output.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    outbound: broadcast::Sender<OutboundMessage>,
    metrics: Arc<EngineMetrics>,
}

impl EngineHandle {
    /// Submit a source event for processing.
    pub async fn submit_event(&self, generation: u64, event: LiveEvent) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::Event { generation, event })
            .await
            .map_err(|_| EngineError::Shutdown)
    }

    /// Advance the accepted source generation.
    pub async fn accept_generation(&self, generation: u64) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::AcceptGeneration(generation))
            .await
            .map_err(|_| EngineError::Shutdown)
    }

    /// Start (or restart) the session. Idempotent to retry.
    pub async fn start_session(&self) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::StartSession)
            .await
            .map_err(|_| EngineError::Shutdown)
    }

    /// Subscribe to the observer broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.outbound.subscribe()
    }

    /// Shared engine metrics.
    pub fn metrics(&self) -> Arc<EngineMetrics> {
        Arc::clone(&self.metrics)
    }
}

/// The aggregation engine: owns the registry and processes commands.
pub struct Engine {
    registry: SessionRegistry,
    policy: GiftTierPolicy,
    config: SessionConfig,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    outbound: broadcast::Sender<OutboundMessage>,
    metrics: Arc<EngineMetrics>,
    /// Events from generations below this are stale and dropped.
    accepted_generation: u64,
}

impl Engine {
    /// Create an engine and its handle. The engine does not process anything
    /// until [`Engine::run`] is awaited (or the step methods are driven
    /// directly, as the tests do).
    pub fn new(
        config: SessionConfig,
        resolver: TeamResolver,
        policy: GiftTierPolicy,
    ) -> (Self, EngineHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
        let (outbound, _) = broadcast::channel(config.observer_buffer);
        let metrics = Arc::new(EngineMetrics::new());

        let handle = EngineHandle {
            cmd_tx,
            outbound: outbound.clone(),
            metrics: Arc::clone(&metrics),
        };

        let registry = SessionRegistry::new(resolver, config.countdown_seconds);

        (
            Self {
                registry,
                policy,
                config,
                cmd_rx,
                outbound,
                metrics,
                accepted_generation: 0,
            },
            handle,
        )
    }

    /// Spawn the engine onto the runtime and return its handle.
    pub fn spawn(
        config: SessionConfig,
        resolver: TeamResolver,
        policy: GiftTierPolicy,
    ) -> EngineHandle {
        let (engine, handle) = Self::new(config, resolver, policy);
        tokio::spawn(engine.run());
        handle
    }

    /// Run the engine loop until every handle is dropped.
    pub async fn run(mut self) {
        info!(
            countdown_seconds = self.config.countdown_seconds,
            broadcast_interval_ms = self.config.broadcast_interval.as_millis() as u64,
            "engine started"
        );

        let start = tokio::time::Instant::now();
        let mut second =
            tokio::time::interval_at(start + Duration::from_secs(1), Duration::from_secs(1));
        second.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cadence = tokio::time::interval_at(
            start + self.config.broadcast_interval,
            self.config.broadcast_interval,
        );
        cadence.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                maybe_cmd = self.cmd_rx.recv() => match maybe_cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = second.tick() => self.tick_second(),
                _ = cadence.tick() => self.flush_snapshot(),
            }
        }

        info!("engine stopped");
    }

    /// Process one command. All registry mutation funnels through here and
    /// the two tick methods, on the single owning task.
    pub fn handle_command(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::Event { generation, event } => {
                if generation < self.accepted_generation {
                    debug!(
                        generation,
                        accepted = self.accepted_generation,
                        event_type = event.event_type_label(),
                        "dropping event from superseded source"
                    );
                    return;
                }
                self.handle_event(event);
            }
            EngineCommand::AcceptGeneration(generation) => {
                debug!(generation, "source generation advanced");
                self.accepted_generation = generation;
            }
            EngineCommand::StartSession => {
                lifecycle::start(&mut self.registry);
            }
        }
    }

    /// Drain and process every queued command without waiting. Lets tests
    /// step the engine deterministically instead of racing the run loop.
    pub fn process_pending(&mut self) {
        while let Ok(cmd) = self.cmd_rx.try_recv() {
            self.handle_command(cmd);
        }
    }

    fn handle_event(&mut self, event: LiveEvent) {
        self.metrics.record_event_processed();

        // Status passes through regardless of session phase; everything else
        // only mutates state while a session is running.
        let is_status = matches!(event, LiveEvent::SourceStatus { .. });
        if !is_status && self.registry.phase() != SessionPhase::Active {
            self.metrics.record_dropped_inactive();
            debug!(
                event_type = event.event_type_label(),
                "dropping event, session not active"
            );
            return;
        }

        match event {
            LiveEvent::SourceStatus {
                connected,
                room_id,
                error,
            } => {
                if let Some(message) = &error {
                    warn!(?room_id, error = %message, "source reported an error");
                }
                self.publish(OutboundMessage::SessionStatus {
                    connected,
                    room_id,
                    error,
                });
            }
            LiveEvent::Comment { contributor, text } => {
                match self.registry.register_contributor(&contributor, &text) {
                    RegisterOutcome::UnknownAlias => self.metrics.record_comment_unresolved(),
                    RegisterOutcome::Registered => self.registry.mark_dirty(),
                    RegisterOutcome::AlreadyRegistered | RegisterOutcome::Inactive => {}
                }
            }
            LiveEvent::Burst {
                contributor_id,
                count,
            } => self.handle_burst(&contributor_id, count),
            LiveEvent::Gift {
                contributor_id,
                gift_name,
                gift_unit_value,
                total_repeats,
                streak_complete,
            } => self.handle_gift(
                &contributor_id,
                &gift_name,
                gift_unit_value,
                total_repeats,
                streak_complete,
            ),
        }
    }

    fn handle_burst(&mut self, contributor_id: &ContributorId, count: u64) {
        let Some(contributor) = self.registry.contributor(contributor_id) else {
            self.metrics.record_dropped_unknown_contributor();
            return;
        };
        let handle = contributor.handle.clone();
        let team_id = contributor.team_id.clone();

        self.registry
            .add_points(contributor_id, scoring::burst_points(count));

        self.publish(OutboundMessage::VisualEvent {
            kind: VisualKind::Burst,
            contributor_handle: handle,
            team_id,
            gift_name: None,
            points: None,
        });
        self.metrics.record_visual_event();
    }

    fn handle_gift(
        &mut self,
        contributor_id: &ContributorId,
        gift_name: &str,
        unit_value: u64,
        total_repeats: u64,
        streak_complete: bool,
    ) {
        // Intermediate streak updates never score; awarding them would
        // multiply one gift action several times over.
        let Some(points) =
            scoring::gift_points(&self.policy, gift_name, unit_value, total_repeats, streak_complete)
        else {
            return;
        };
        if points == 0 {
            return;
        }

        let Some(contributor) = self.registry.contributor(contributor_id) else {
            self.metrics.record_dropped_unknown_contributor();
            return;
        };
        let handle = contributor.handle.clone();
        let team_id = contributor.team_id.clone();

        self.registry.add_points(contributor_id, points);

        self.publish(OutboundMessage::VisualEvent {
            kind: VisualKind::Gift,
            contributor_handle: handle,
            team_id,
            gift_name: Some(gift_name.to_string()),
            points: Some(points),
        });
        self.metrics.record_visual_event();
    }

    /// One second of wall clock elapsed: advance the lifecycle.
    pub fn tick_second(&mut self) {
        match lifecycle::tick(&mut self.registry, self.config.top_contributors) {
            TickOutcome::Finished(summary) => {
                self.metrics.record_session_completed();
                self.publish(OutboundMessage::SessionComplete {
                    ranked_teams: summary.ranked_teams,
                    top_contributors: summary.top_contributors,
                });
            }
            TickOutcome::Ticked { .. } | TickOutcome::Idle => {}
        }
    }

    /// Broadcast cadence fired: publish one coalesced snapshot if anything
    /// changed since the last flush.
    pub fn flush_snapshot(&mut self) {
        if !self.registry.is_dirty() {
            return;
        }
        let board = self.registry.snapshot();
        self.registry.clear_dirty();

        self.publish(OutboundMessage::StateSnapshot {
            teams: board.teams,
            countdown_seconds: board.countdown_seconds,
            active: board.active,
        });
        self.metrics.record_snapshot_published();
    }

    /// Read access for assertions in tests.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    fn publish(&self, message: OutboundMessage) {
        // Err means no observer is currently subscribed; output is
        // fire-and-forget so that is not a failure.
        let _ = self.outbound.send(message);
    }
}
