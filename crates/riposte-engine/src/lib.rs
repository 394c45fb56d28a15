//! Matchmaking and duel-session coordination for Riposte.
//!
//! This crate is the core of the server: everything with real invariants
//! lives here, and none of it knows about sockets. The pieces, leaves
//! first:
//!
//! - [`Registry`] — who is connected, their presence state, and the
//!   outbound channel for each endpoint.
//! - [`MatchQueue`] — FIFO of endpoints awaiting an opponent; pairing is
//!   greedy and immediate.
//! - [`ruleset`] — the pure `(move, move) → outcome` resolution logic.
//! - [`SessionStore`] — live sessions: participants, per-round move
//!   buffer, score or duel counters.
//! - [`Engine`] — orchestrates the lifecycle: waiting → paired →
//!   round-active → resolved → continue or terminated.
//!
//! # Concurrency model
//!
//! The [`Engine`] owns all mutable state and is driven by a single
//! consumer: either called directly (tests) or behind the actor loop
//! spawned by [`spawn_engine`], which drains an mpsc mailbox one command
//! at a time. Each inbound event is processed to completion before the
//! next — no locking, no interleaving.

mod config;
mod engine;
mod error;
mod queue;
mod registry;
pub mod ruleset;
mod session;

pub use config::EngineConfig;
pub use engine::{
    Engine, EngineCommand, EngineHandle, EngineSnapshot, spawn_engine,
};
pub use error::EngineError;
pub use queue::{MatchQueue, Pairing, QueueEntry};
pub use registry::{OutboundSender, Registry};
pub use ruleset::{Resolution, Ruleset, Side};
pub use session::{Session, SessionProgress, SessionStore};
