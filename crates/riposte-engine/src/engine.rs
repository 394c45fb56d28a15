//! Lifecycle engine: the single consumer that owns all mutable state.
//!
//! The [`Engine`] drives every endpoint through the lifecycle: waiting →
//! paired → round-active → resolved → continue or terminated. It can be
//! called directly (tests) or run behind the actor loop spawned by
//! [`spawn_engine`], which drains an mpsc mailbox one command at a time —
//! no shared mutable state, just message passing.

use riposte_protocol::{
    ClientEvent, EndpointId, Move, RoundOutcome, ServerEvent, SessionId, Verdict,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::queue::{MatchQueue, QueueEntry};
use crate::registry::{OutboundSender, Registry};
use crate::ruleset::{Resolution, Side, resolve};
use crate::session::{Session, SessionProgress, SessionStore};

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns the registry, the matchmaking queue, and the session store, and
/// applies every inbound event to completion before the next.
///
/// All state is explicit and dependency-injected through
/// [`EngineConfig`]; there are no globals. Malformed or stale input never
/// panics: it is contained as a silent no-op (logged at debug), except
/// for an out-of-alphabet move, which earns the offender an `Error`
/// event.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    registry: Registry,
    queue: MatchQueue,
    sessions: SessionStore,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            queue: MatchQueue::new(),
            sessions: SessionStore::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registers a new connection: the endpoint learns its own id and
    /// everyone gets the updated roster.
    pub fn connect(&mut self, endpoint: EndpointId, sender: OutboundSender) {
        self.registry.insert(endpoint, sender);
        info!(%endpoint, connected = self.registry.len(), "endpoint connected");

        self.registry
            .emit_to(endpoint, ServerEvent::Connected { endpoint });
        self.broadcast_roster();
    }

    /// Queues the endpoint for matchmaking, or starts a session if an
    /// opponent was already waiting.
    pub fn join(&mut self, endpoint: EndpointId, metadata: Option<serde_json::Value>) {
        if !self.registry.contains(endpoint) {
            debug!(%endpoint, "join from unknown endpoint, ignoring");
            return;
        }
        if self.queue.contains(endpoint) {
            debug!(%endpoint, "already waiting, join ignored");
            return;
        }

        if let Some(name) = metadata
            .as_ref()
            .and_then(|m| m.get("name"))
            .and_then(|v| v.as_str())
        {
            self.registry.set_name(endpoint, name);
        }

        let entry = QueueEntry { endpoint, metadata };
        match self.queue.enqueue(entry) {
            Some(pairing) => {
                let participants = [pairing.first.endpoint, pairing.second.endpoint];
                let metadata = [pairing.first.metadata, pairing.second.metadata];
                let session_id =
                    self.sessions
                        .create(participants, metadata, self.config.ruleset);

                info!(
                    %session_id,
                    first = %participants[0],
                    second = %participants[1],
                    ruleset = %self.config.ruleset,
                    "session started"
                );

                // Each side sees the other side's metadata.
                let session = match self.sessions.get(&session_id) {
                    Some(s) => s,
                    None => return,
                };
                for participant in participants {
                    let opponent = match session.opponent_of(participant) {
                        Some(o) => o,
                        None => continue,
                    };
                    self.registry.emit_to(
                        participant,
                        ServerEvent::Started {
                            session_id: session_id.clone(),
                            opponent_present: true,
                            opponent: session.metadata_of(opponent).cloned(),
                        },
                    );
                }
            }
            None => {
                debug!(%endpoint, "queued, awaiting opponent");
                self.registry.emit_to(endpoint, ServerEvent::Waiting);
            }
        }
    }

    /// Records a move for the current round, resolving the round once
    /// both sides have committed.
    pub fn submit_move(&mut self, endpoint: EndpointId, session_id: SessionId, mov: Move) {
        if let Err(err) = self.try_move(endpoint, &session_id, mov) {
            match err {
                EngineError::MoveNotAllowed(mov, ruleset) => {
                    debug!(%endpoint, %mov, %ruleset, "move outside ruleset alphabet");
                    self.registry.emit_to(
                        endpoint,
                        ServerEvent::Error {
                            code: 422,
                            message: format!("move {mov} is not part of the {ruleset} ruleset"),
                        },
                    );
                }
                err => debug!(%endpoint, %session_id, %err, "move ignored"),
            }
        }
    }

    fn try_move(
        &mut self,
        endpoint: EndpointId,
        session_id: &SessionId,
        mov: Move,
    ) -> Result<(), EngineError> {
        // Validate against the stale-reference cases before any mutation.
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| EngineError::SessionNotFound(session_id.clone()))?;
        let opponent = session
            .opponent_of(endpoint)
            .ok_or_else(|| EngineError::NotAParticipant(endpoint, session_id.clone()))?;
        if !self.config.ruleset.allows(mov) {
            return Err(EngineError::MoveNotAllowed(mov, self.config.ruleset));
        }

        session.record_move(endpoint, mov);
        self.registry.emit_to(opponent, ServerEvent::OpponentMoved);

        if !session.both_moved() {
            return Ok(());
        }

        // Both moves in: resolve, apply, report, advance.
        let (move_a, move_b) = match session.take_moves() {
            Some(moves) => moves,
            None => return Ok(()),
        };
        let resolution = resolve(move_a, move_b, self.config.ruleset);
        session.apply(&resolution);

        let round = session.round();
        let results = [
            (
                session.participants()[0],
                round_result_for(session, Side::A, move_a, move_b, &resolution, round),
            ),
            (
                session.participants()[1],
                round_result_for(session, Side::B, move_b, move_a, &resolution, round),
            ),
        ];

        session.advance_round();
        let finished = session.finished(&self.config);

        for (participant, event) in results {
            self.registry.emit_to(participant, event);
        }

        if finished {
            // Clean termination is silent: clients track the cap
            // themselves, the session simply ceases to exist.
            self.sessions.remove(session_id);
            info!(%session_id, round, "session finished");
        }

        Ok(())
    }

    /// Updates a presence position (clamped to the map) and re-broadcasts
    /// the roster.
    pub fn position(&mut self, endpoint: EndpointId, x: f64, y: f64) {
        if !self.registry.contains(endpoint) {
            debug!(%endpoint, "position from unknown endpoint, ignoring");
            return;
        }
        let x = x.clamp(0.0, self.config.map_width);
        let y = y.clamp(0.0, self.config.map_height);
        self.registry.set_position(endpoint, x, y);
        self.broadcast_roster();
    }

    /// Delivers a chat line to everyone within the chat radius of the
    /// sender, the sender included.
    pub fn chat(&mut self, endpoint: EndpointId, text: String) {
        let Some(sender_name) = self.registry.name(endpoint).map(str::to_owned) else {
            debug!(%endpoint, "chat from unknown endpoint, ignoring");
            return;
        };

        let mut targets = self.registry.nearby(endpoint, self.config.chat_radius);
        targets.push(endpoint);

        let event = ServerEvent::ChatMessage {
            sender: endpoint,
            sender_name,
            text,
        };
        self.registry.emit_to_many(&targets, &event);
    }

    /// Tears down everything tied to a departed endpoint. Idempotent: a
    /// second call for the same endpoint is a total no-op.
    pub fn disconnect(&mut self, endpoint: EndpointId) {
        if !self.registry.remove(endpoint) {
            debug!(%endpoint, "disconnect for unknown endpoint, ignoring");
            return;
        }
        info!(%endpoint, connected = self.registry.len(), "endpoint disconnected");

        self.broadcast_roster();
        self.queue.remove(endpoint);

        for session_id in self.sessions.sessions_of(endpoint) {
            if let Some(session) = self.sessions.remove(&session_id) {
                if let Some(survivor) = session.opponent_of(endpoint) {
                    self.registry.emit_to(survivor, ServerEvent::OpponentLeft);
                }
                info!(%session_id, %endpoint, "session abandoned");
            }
        }
    }

    /// Applies a decoded client event. The handler-facing entry point.
    pub fn handle_event(&mut self, endpoint: EndpointId, event: ClientEvent) {
        match event {
            ClientEvent::Join { metadata } => self.join(endpoint, metadata),
            ClientEvent::Move { session_id, mov } => {
                self.submit_move(endpoint, session_id, mov)
            }
            ClientEvent::Position { x, y } => self.position(endpoint, x, y),
            ClientEvent::Chat { text } => self.chat(endpoint, text),
        }
    }

    /// A point-in-time count of engine state, for tests and operations.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            connected: self.registry.len(),
            waiting: self.queue.len(),
            sessions: self.sessions.len(),
        }
    }

    fn broadcast_roster(&self) {
        self.registry.broadcast(&ServerEvent::Roster {
            players: self.registry.roster(),
        });
    }
}

/// Builds one participant's view of a resolved round.
fn round_result_for(
    session: &Session,
    side: Side,
    your_move: Move,
    opponent_move: Move,
    resolution: &Resolution,
    round: u32,
) -> ServerEvent {
    let me = session.participants()[match side {
        Side::A => 0,
        Side::B => 1,
    }];
    let opponent = session.participants()[match side {
        Side::A => 1,
        Side::B => 0,
    }];

    let outcome = match session.progress() {
        SessionProgress::Scores(scores) => RoundOutcome::Score {
            verdict: match resolution.winner {
                Some(winner) if winner == side => Verdict::You,
                Some(_) => Verdict::Opponent,
                None => Verdict::Tie,
            },
            your_score: scores.get(&me).copied().unwrap_or_default(),
            opponent_score: scores.get(&opponent).copied().unwrap_or_default(),
        },
        SessionProgress::Duel(states) => RoundOutcome::Duel {
            your_effects: resolution.effects(side),
            opponent_effects: resolution.effects(side.other()),
            your_state: states.get(&me).copied().unwrap_or_default(),
            opponent_state: states.get(&opponent).copied().unwrap_or_default(),
        },
    };

    ServerEvent::RoundResult {
        session_id: session.id().clone(),
        round,
        your_move,
        opponent_move,
        outcome,
    }
}

// ---------------------------------------------------------------------------
// Actor loop
// ---------------------------------------------------------------------------

/// Commands sent to the engine actor through its mailbox.
///
/// The `Inspect` variant carries a "reply channel" — the caller sends the
/// command and waits for the snapshot on that channel.
pub enum EngineCommand {
    Connect {
        endpoint: EndpointId,
        sender: OutboundSender,
    },
    Event {
        endpoint: EndpointId,
        event: ClientEvent,
    },
    Disconnect {
        endpoint: EndpointId,
    },
    Inspect {
        reply: oneshot::Sender<EngineSnapshot>,
    },
}

/// A point-in-time count of engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSnapshot {
    /// Registered endpoints.
    pub connected: usize,
    /// Endpoints waiting for an opponent.
    pub waiting: usize,
    /// Live sessions.
    pub sessions: usize,
}

/// Handle to a running engine actor. Cheap to clone — it's just an
/// `mpsc::Sender` wrapper. Every connection handler holds one.
#[derive(Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Registers a new connection with the engine.
    pub async fn connect(
        &self,
        endpoint: EndpointId,
        sender: OutboundSender,
    ) -> Result<(), EngineError> {
        self.send(EngineCommand::Connect { endpoint, sender }).await
    }

    /// Forwards a decoded client event.
    pub async fn event(
        &self,
        endpoint: EndpointId,
        event: ClientEvent,
    ) -> Result<(), EngineError> {
        self.send(EngineCommand::Event { endpoint, event }).await
    }

    /// Tears down an endpoint's state after its connection closed.
    pub async fn disconnect(&self, endpoint: EndpointId) -> Result<(), EngineError> {
        self.send(EngineCommand::Disconnect { endpoint }).await
    }

    /// Requests a state snapshot.
    pub async fn inspect(&self) -> Result<EngineSnapshot, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineCommand::Inspect { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| EngineError::Closed)
    }

    async fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| EngineError::Closed)
    }
}

/// Spawns the engine actor task and returns a handle to it.
///
/// The mailbox is bounded, so a flood of inbound events applies
/// backpressure to connection handlers rather than growing memory.
pub fn spawn_engine(config: EngineConfig) -> EngineHandle {
    let (tx, mut rx) = mpsc::channel::<EngineCommand>(64);
    let mut engine = Engine::new(config);

    tokio::spawn(async move {
        info!(ruleset = %engine.config().ruleset, "engine started");

        while let Some(command) = rx.recv().await {
            match command {
                EngineCommand::Connect { endpoint, sender } => {
                    engine.connect(endpoint, sender);
                }
                EngineCommand::Event { endpoint, event } => {
                    engine.handle_event(endpoint, event);
                }
                EngineCommand::Disconnect { endpoint } => {
                    engine.disconnect(endpoint);
                }
                EngineCommand::Inspect { reply } => {
                    let _ = reply.send(engine.snapshot());
                }
            }
        }

        info!("engine stopped");
    });

    EngineHandle { sender: tx }
}

// =========================================================================
// Tests
// =========================================================================
