//! Per-connection handler: registration, event routing, teardown.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register the endpoint with the engine (carrying its outbound
//!      channel) — the engine answers with `Connected` and the roster
//!   2. Spawn a writer task draining the outbound channel to the socket
//!   3. Loop: receive frames → decode `ClientEvent` → forward to the
//!      engine
//!   4. On close or error, tell the engine the endpoint is gone

use riposte_engine::EngineHandle;
use riposte_protocol::{ClientEvent, Codec, EndpointId, JsonCodec, ServerEvent};
use riposte_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::RiposteError;

/// Drop guard that disconnects an endpoint when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async send;
/// the engine's disconnect is idempotent, so a double fire is harmless.
struct DisconnectGuard {
    endpoint: EndpointId,
    engine: EngineHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let endpoint = self.endpoint;
        let engine = self.engine.clone();
        tokio::spawn(async move {
            let _ = engine.disconnect(endpoint).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    engine: EngineHandle,
    codec: JsonCodec,
) -> Result<(), RiposteError> {
    // The connection id is process-unique, so it doubles as the endpoint
    // id for the connection's lifetime.
    let endpoint = EndpointId(conn.id().into_inner());
    tracing::debug!(%endpoint, "handling new connection");

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<ServerEvent>();
    engine.connect(endpoint, outbound_tx).await?;
    let _guard = DisconnectGuard {
        endpoint,
        engine: engine.clone(),
    };

    // Writer: drains the engine's outbound channel onto the socket. Ends
    // on its own once the engine drops the sender (after disconnect).
    let writer_conn = conn.clone();
    let writer = tokio::spawn(write_outbound(writer_conn, outbound_rx, codec, endpoint));

    // Reader: frames → events → engine.
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%endpoint, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%endpoint, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                // Malformed frames (including unknown event types and
                // move strings) are dropped; the connection stays up.
                tracing::debug!(%endpoint, error = %e, "undecodable frame, dropping");
                continue;
            }
        };

        engine.event(endpoint, event).await?;
    }

    // _guard drops here → engine disconnect fires, the engine drops our
    // outbound sender, and the writer drains out.
    drop(_guard);
    let _ = writer.await;
    Ok(())
}

/// Encodes outbound events and writes them to the socket until the
/// channel closes or a send fails.
async fn write_outbound(
    conn: WebSocketConnection,
    mut outbound: mpsc::UnboundedReceiver<ServerEvent>,
    codec: JsonCodec,
    endpoint: EndpointId,
) {
    while let Some(event) = outbound.recv().await {
        let bytes = match codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(%endpoint, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%endpoint, error = %e, "send failed, stopping writer");
            break;
        }
    }
}
