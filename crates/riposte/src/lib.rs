//! # Riposte
//!
//! Real-time matchmaking and duel-session coordination for web games.
//!
//! Riposte pairs connected players first-come-first-served, runs each
//! pair through a simultaneous-reveal round loop (rock-paper-scissors or
//! an attack/mana duel), and layers a lightweight presence world —
//! positions and proximity chat — over the same connections.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use riposte::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), RiposteError> {
//!     let server = RiposteServer::builder()
//!         .bind("0.0.0.0:8080")
//!         .engine_config(EngineConfig::default())
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod server;

pub use error::RiposteError;
pub use server::{RiposteServer, RiposteServerBuilder};

/// The common imports for building and running a server.
pub mod prelude {
    pub use crate::{RiposteError, RiposteServer, RiposteServerBuilder};
    pub use riposte_engine::{EngineConfig, EngineHandle, Ruleset};
    pub use riposte_protocol::{
        ClientEvent, EndpointId, Move, RoundOutcome, ServerEvent, SessionId, Verdict,
    };
}
