//! Error types for the engine layer.

use riposte_protocol::{EndpointId, Move, SessionId};

use crate::Ruleset;

/// Errors that can occur during engine operations.
///
/// Most of these never reach a client: stale references are contained as
/// silent no-ops (logged at debug level), per the failure semantics of
/// the event protocol. Only [`MoveNotAllowed`](Self::MoveNotAllowed) is
/// reported back, as an `Error` event to the offending endpoint.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The endpoint is not registered (never connected, or already gone).
    #[error("unknown endpoint {0}")]
    UnknownEndpoint(EndpointId),

    /// The session id does not reference a live session.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// The endpoint is not one of the session's two participants.
    #[error("endpoint {0} is not a participant of session {1}")]
    NotAParticipant(EndpointId, SessionId),

    /// The move is outside the active ruleset's alphabet.
    #[error("move {0} is not part of the {1} ruleset")]
    MoveNotAllowed(Move, Ruleset),

    /// The engine's command mailbox is closed (engine task gone).
    #[error("engine is not running")]
    Closed,
}
