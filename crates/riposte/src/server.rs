//! `RiposteServer` builder and accept loop.
//!
//! This is the entry point for running a Riposte server. It ties
//! together all the layers: transport → protocol → engine.

use riposte_engine::{EngineConfig, EngineHandle, spawn_engine};
use riposte_protocol::JsonCodec;
use riposte_transport::{Transport, WebSocketTransport};

use crate::RiposteError;
use crate::handler::handle_connection;

/// Builder for configuring and starting a Riposte server.
///
/// # Example
///
/// ```rust,ignore
/// use riposte::prelude::*;
///
/// let server = RiposteServer::builder()
///     .bind("0.0.0.0:8080")
///     .engine_config(EngineConfig::default())
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct RiposteServerBuilder {
    bind_addr: String,
    engine_config: EngineConfig,
}

impl RiposteServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            engine_config: EngineConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the engine configuration (ruleset, caps, presence bounds).
    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = config;
        self
    }

    /// Binds the transport and spawns the engine actor.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<RiposteServer, RiposteError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let engine = spawn_engine(self.engine_config);

        Ok(RiposteServer {
            transport,
            engine,
            codec: JsonCodec,
        })
    }
}

impl Default for RiposteServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Riposte server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct RiposteServer {
    transport: WebSocketTransport,
    engine: EngineHandle,
    codec: JsonCodec,
}

impl RiposteServer {
    /// Creates a new builder.
    pub fn builder() -> RiposteServerBuilder {
        RiposteServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the running engine, for inspection.
    pub fn engine(&self) -> EngineHandle {
        self.engine.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Each accepted connection gets its own handler task. Runs until
    /// the process is terminated.
    pub async fn run(mut self) -> Result<(), RiposteError> {
        tracing::info!("Riposte server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let engine = self.engine.clone();
                    let codec = self.codec;
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, engine, codec).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
