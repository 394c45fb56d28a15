//! Wire protocol for Riposte.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`EndpointId`],
//!   [`Move`], etc.) — the event structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the engine
//! (matchmaking and session state). It doesn't know about connections or
//! sessions — it only knows how to describe and serialize events.
//!
//! ```text
//! Transport (bytes) → Protocol (events) → Engine (queue + sessions)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ClientEvent, DuelistState, EndpointId, Move, PlayerInfo, RoundOutcome,
    ServerEvent, SessionId, SideEffects, Verdict,
};
