//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::Ruleset;

/// Configuration for an [`Engine`](crate::Engine) instance.
///
/// One engine runs one game variant: the ruleset is fixed for the life of
/// the process, and every session it creates uses it. Presence settings
/// (map bounds, chat radius) live here too so handlers receive no ambient
/// globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The move alphabet and resolution rules for every session.
    pub ruleset: Ruleset,

    /// Elimination ruleset: the session ends after this many resolved
    /// rounds.
    pub round_cap: u32,

    /// Resource duel: the session ends on the round a duelist's
    /// accumulated damage reaches this value.
    pub damage_cap: u32,

    /// Presence map bounds. Positions are clamped into `[0, width]` and
    /// `[0, height]`.
    pub map_width: f64,
    pub map_height: f64,

    /// Chat messages reach players within this Euclidean distance of the
    /// sender.
    pub chat_radius: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ruleset: Ruleset::Elimination,
            round_cap: 3,
            damage_cap: 5,
            map_width: 1000.0,
            map_height: 1000.0,
            chat_radius: 100.0,
        }
    }
}
