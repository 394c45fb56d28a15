//! Unified error type for the Riposte server.

use riposte_engine::EngineError;
use riposte_protocol::ProtocolError;
use riposte_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `riposte` server crate, you deal with this single
/// error type instead of importing errors from each sub-crate. The
/// `#[from]` attribute on each variant auto-generates `From` impls, so
/// the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RiposteError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid event).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An engine-level error (engine task gone).
    #[error(transparent)]
    Engine(#[from] EngineError),
}
