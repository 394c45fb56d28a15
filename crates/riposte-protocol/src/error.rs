//! Error types for the protocol layer.
//!
//! Each crate in Riposte defines its own error enum. When you see a
//! `ProtocolError`, the problem is in serialization — not in networking
//! or in session state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed. Common causes: malformed JSON, an unknown
    /// event tag, an out-of-alphabet move string, missing fields.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The event is invalid at the protocol level even though it parsed.
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}
