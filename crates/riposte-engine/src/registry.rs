//! Connection registry: who is connected, and how to reach them.
//!
//! The registry is the engine's only door to the outside world. Each
//! entry pairs an endpoint with the outbound channel of its connection
//! handler plus per-connection ancillary state (display name, presence
//! position). Sends are fire-and-forget: at-most-once, no acknowledgment
//! awaited, and a dropped receiver is silently ignored.

use std::collections::HashMap;

use rand::Rng;
use riposte_protocol::{EndpointId, PlayerInfo, ServerEvent};
use tokio::sync::mpsc;

/// Channel sender for delivering outbound events to one endpoint.
pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;

/// Per-connection state kept for the lifetime of the connection.
#[derive(Debug)]
struct PlayerEntry {
    sender: OutboundSender,
    name: String,
    x: f64,
    y: f64,
}

/// Tracks currently connected endpoints.
#[derive(Debug, Default)]
pub struct Registry {
    players: HashMap<EndpointId, PlayerEntry>,
}

impl Registry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly connected endpoint.
    ///
    /// The player spawns at a random position near the map's corner
    /// region (the client re-centers on its own map size) and gets a
    /// default display name until a join supplies a real one.
    pub fn insert(&mut self, endpoint: EndpointId, sender: OutboundSender) {
        let mut rng = rand::rng();
        let entry = PlayerEntry {
            sender,
            name: format!("Player {endpoint}"),
            x: rng.random_range(25.0..375.0),
            y: rng.random_range(25.0..375.0),
        };
        self.players.insert(endpoint, entry);
    }

    /// Removes an endpoint. Returns `true` if it was registered.
    pub fn remove(&mut self, endpoint: EndpointId) -> bool {
        self.players.remove(&endpoint).is_some()
    }

    /// Returns `true` if the endpoint is currently connected.
    pub fn contains(&self, endpoint: EndpointId) -> bool {
        self.players.contains_key(&endpoint)
    }

    /// Number of connected endpoints.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Overrides the display name (from join metadata).
    pub fn set_name(&mut self, endpoint: EndpointId, name: &str) {
        if let Some(entry) = self.players.get_mut(&endpoint) {
            entry.name = name.to_string();
        }
    }

    /// Returns the display name, if the endpoint is connected.
    pub fn name(&self, endpoint: EndpointId) -> Option<&str> {
        self.players.get(&endpoint).map(|e| e.name.as_str())
    }

    /// Stores a (pre-clamped) presence position.
    pub fn set_position(&mut self, endpoint: EndpointId, x: f64, y: f64) {
        if let Some(entry) = self.players.get_mut(&endpoint) {
            entry.x = x;
            entry.y = y;
        }
    }

    /// Endpoints within `radius` (Euclidean) of the given endpoint,
    /// excluding the endpoint itself.
    pub fn nearby(&self, endpoint: EndpointId, radius: f64) -> Vec<EndpointId> {
        let Some(origin) = self.players.get(&endpoint) else {
            return Vec::new();
        };
        self.players
            .iter()
            .filter(|(id, entry)| {
                **id != endpoint
                    && (entry.x - origin.x).hypot(entry.y - origin.y) <= radius
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// The full presence roster, sorted by endpoint id for a stable wire
    /// representation.
    pub fn roster(&self) -> Vec<PlayerInfo> {
        let mut players: Vec<PlayerInfo> = self
            .players
            .iter()
            .map(|(id, entry)| PlayerInfo {
                endpoint: *id,
                name: entry.name.clone(),
                x: entry.x,
                y: entry.y,
            })
            .collect();
        players.sort_by_key(|p| p.endpoint.0);
        players
    }

    /// Emits an event to a single endpoint. Silently drops if the
    /// endpoint is gone or its handler has hung up.
    pub fn emit_to(&self, endpoint: EndpointId, event: ServerEvent) {
        if let Some(entry) = self.players.get(&endpoint) {
            let _ = entry.sender.send(event);
        }
    }

    /// Emits a clone of the event to each of the given endpoints.
    pub fn emit_to_many(&self, endpoints: &[EndpointId], event: &ServerEvent) {
        for endpoint in endpoints {
            self.emit_to(*endpoint, event.clone());
        }
    }

    /// Emits a clone of the event to every connected endpoint.
    pub fn broadcast(&self, event: &ServerEvent) {
        for entry in self.players.values() {
            let _ = entry.sender.send(event.clone());
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
