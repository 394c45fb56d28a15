//! Core protocol types for Riposte's wire format.
//!
//! Everything in this module is a structure that gets serialized to JSON,
//! sent over the wire, and deserialized on the other side. The shapes are
//! load-bearing: a serde attribute change here is a protocol change.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique, opaque identifier for one connected client.
///
/// An endpoint lives exactly as long as its connection: it is assigned on
/// accept and destroyed on disconnect. No two live endpoints share an id.
///
/// `#[serde(transparent)]` makes `EndpointId(42)` serialize as plain `42`
/// rather than `{ "0": 42 }`, which is what client SDKs expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(pub u64);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E-{}", self.0)
    }
}

/// A unique identifier for one duel session between exactly two endpoints.
///
/// Generated server-side at pairing time as a 32-character hex token.
/// Ids are assumed collision-free; a collision would be an invariant
/// violation, not an expected condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// One move from the closed move alphabet.
///
/// The alphabet spans both rulesets: `rock`/`paper`/`scissors` belong to
/// the elimination ruleset, `attack`/`mana` to the resource duel. A string
/// outside this set fails deserialization outright — malformed moves never
/// make it past the protocol layer. Whether a *parsed* move fits the
/// session's ruleset is checked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Rock,
    Paper,
    Scissors,
    Attack,
    Mana,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rock => "rock",
            Self::Paper => "paper",
            Self::Scissors => "scissors",
            Self::Attack => "attack",
            Self::Mana => "mana",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Round outcome — per-participant views
// ---------------------------------------------------------------------------

/// Who won a resolved round, from one participant's point of view.
///
/// Each participant gets their own verdict: the same round resolves to
/// `You` on the winner's connection and `Opponent` on the loser's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    You,
    Opponent,
    Tie,
}

/// What one round did to one side of a resource duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SideEffects {
    /// This side took a hit this round.
    pub damage: bool,
    /// This side gained a mana point this round.
    pub mana_gained: bool,
}

/// Accumulated state for one side of a resource duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DuelistState {
    /// Total hits taken since the session started.
    pub damage_taken: u32,
    /// Total mana points gained since the session started.
    pub mana: u32,
}

/// The ruleset-specific portion of a round result.
///
/// Always expressed from the receiving participant's point of view —
/// `your_*` fields describe the receiver, `opponent_*` the other side.
/// This is deliberate: "damage to me" and "damage to my opponent" must
/// each be reported correctly from each side, so the server builds one
/// outcome per participant rather than broadcasting a shared view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoundOutcome {
    /// Elimination ruleset: a winner (or tie) and the running score.
    Score {
        verdict: Verdict,
        your_score: u32,
        opponent_score: u32,
    },

    /// Resource duel: per-side effects for this round plus running totals.
    Duel {
        your_effects: SideEffects,
        opponent_effects: SideEffects,
        your_state: DuelistState,
        opponent_state: DuelistState,
    },
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// One connected player's presence entry, as broadcast in [`ServerEvent::Roster`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub endpoint: EndpointId,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

// ---------------------------------------------------------------------------
// Client → server events
// ---------------------------------------------------------------------------

/// Events a client sends to the server. All fire-and-forget: the protocol
/// requires no acknowledgment for any of them.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
///   `{ "type": "Join", "metadata": { "name": "ada" } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Request a match: enqueue, or pair with a waiting opponent.
    ///
    /// `metadata` is an opaque bag of player attributes (name, avatar,
    /// base stats) carried through to the opponent's start event. Absent
    /// for game variants that need no personalization.
    Join {
        #[serde(default)]
        metadata: Option<serde_json::Value>,
    },

    /// Submit a move for the current round of a session.
    Move {
        session_id: SessionId,
        #[serde(rename = "move")]
        mov: Move,
    },

    /// Presence: report a new position on the map.
    Position { x: f64, y: f64 },

    /// Presence: send a proximity chat message.
    Chat { text: String },
}

// ---------------------------------------------------------------------------
// Server → client events
// ---------------------------------------------------------------------------

/// Events the server emits to clients. Delivery is at-most-once with no
/// ordering guarantee beyond per-connection FIFO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// First event on every connection: tells the client its endpoint id.
    Connected { endpoint: EndpointId },

    /// The join request was queued; an opponent will arrive eventually.
    Waiting,

    /// A pairing completed. Sent to both participants; each side receives
    /// the *opponent's* join metadata, not its own.
    Started {
        session_id: SessionId,
        opponent_present: bool,
        #[serde(default)]
        opponent: Option<serde_json::Value>,
    },

    /// The other participant submitted a move (sent to the non-acting
    /// participant only — the acting player gets no echo).
    OpponentMoved,

    /// A round resolved. Per-participant view: `your_move` is always the
    /// receiver's own move.
    RoundResult {
        session_id: SessionId,
        round: u32,
        your_move: Move,
        opponent_move: Move,
        outcome: RoundOutcome,
    },

    /// The other participant disconnected; the session is gone.
    OpponentLeft,

    /// Presence: the full set of connected players.
    Roster { players: Vec<PlayerInfo> },

    /// Presence: a chat message from a nearby player (or the sender's echo).
    ChatMessage {
        sender: EndpointId,
        sender_name: String,
        text: String,
    },

    /// Something was wrong with a request. Targeted at the offending
    /// endpoint only; `code` follows HTTP-style conventions.
    Error { code: u16, message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Tests for protocol types and their JSON serialization.
    //!
    //! The wire format is consumed by a JavaScript client, so these tests
    //! pin the exact JSON shapes — a serde attribute regression here breaks
    //! every client.

    use super::*;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_endpoint_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&EndpointId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_endpoint_id_deserializes_from_plain_number() {
        let id: EndpointId = serde_json::from_str("42").unwrap();
        assert_eq!(id, EndpointId(42));
    }

    #[test]
    fn test_endpoint_id_display() {
        assert_eq!(EndpointId(7).to_string(), "E-7");
    }

    #[test]
    fn test_session_id_serializes_as_plain_string() {
        let id = SessionId("abc123".into());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc123\"");
    }

    #[test]
    fn test_session_id_display_is_bare_token() {
        assert_eq!(SessionId("deadbeef".into()).to_string(), "deadbeef");
    }

    // =====================================================================
    // Move
    // =====================================================================

    #[test]
    fn test_move_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Move::Rock).unwrap(), "\"rock\"");
        assert_eq!(serde_json::to_string(&Move::Mana).unwrap(), "\"mana\"");
    }

    #[test]
    fn test_move_unknown_string_fails_to_deserialize() {
        // The alphabet is closed: anything else is rejected at the
        // protocol layer, before the engine ever sees it.
        let result: Result<Move, _> = serde_json::from_str("\"lizard\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_move_round_trip_all_variants() {
        for mov in [Move::Rock, Move::Paper, Move::Scissors, Move::Attack, Move::Mana] {
            let json = serde_json::to_string(&mov).unwrap();
            let back: Move = serde_json::from_str(&json).unwrap();
            assert_eq!(mov, back);
        }
    }

    // =====================================================================
    // ClientEvent — JSON shapes
    // =====================================================================

    #[test]
    fn test_client_event_join_json_format() {
        let event = ClientEvent::Join {
            metadata: Some(serde_json::json!({ "name": "ada" })),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "Join");
        assert_eq!(json["metadata"]["name"], "ada");
    }

    #[test]
    fn test_client_event_join_metadata_defaults_when_missing() {
        // A bare `{"type": "Join"}` must parse — metadata is optional.
        let event: ClientEvent = serde_json::from_str(r#"{"type": "Join"}"#).unwrap();
        assert_eq!(event, ClientEvent::Join { metadata: None });
    }

    #[test]
    fn test_client_event_move_uses_move_key_on_wire() {
        // The field is `mov` in Rust (`move` is a keyword) but `move`
        // on the wire.
        let event = ClientEvent::Move {
            session_id: SessionId("s1".into()),
            mov: Move::Scissors,
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "Move");
        assert_eq!(json["session_id"], "s1");
        assert_eq!(json["move"], "scissors");
    }

    #[test]
    fn test_client_event_position_round_trip() {
        let event = ClientEvent::Position { x: 12.5, y: 900.0 };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ClientEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_client_event_chat_round_trip() {
        let event = ClientEvent::Chat { text: "en garde".into() };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ClientEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    // =====================================================================
    // ServerEvent — JSON shapes
    // =====================================================================

    #[test]
    fn test_server_event_started_json_format() {
        let event = ServerEvent::Started {
            session_id: SessionId("abc".into()),
            opponent_present: true,
            opponent: Some(serde_json::json!({ "name": "grace" })),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "Started");
        assert_eq!(json["session_id"], "abc");
        assert_eq!(json["opponent_present"], true);
        assert_eq!(json["opponent"]["name"], "grace");
    }

    #[test]
    fn test_server_event_waiting_round_trip() {
        let event = ServerEvent::Waiting;
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_server_event_round_result_score_json_format() {
        let event = ServerEvent::RoundResult {
            session_id: SessionId("abc".into()),
            round: 2,
            your_move: Move::Rock,
            opponent_move: Move::Scissors,
            outcome: RoundOutcome::Score {
                verdict: Verdict::You,
                your_score: 1,
                opponent_score: 0,
            },
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "RoundResult");
        assert_eq!(json["round"], 2);
        assert_eq!(json["your_move"], "rock");
        assert_eq!(json["opponent_move"], "scissors");
        assert_eq!(json["outcome"]["type"], "Score");
        assert_eq!(json["outcome"]["verdict"], "you");
        assert_eq!(json["outcome"]["your_score"], 1);
    }

    #[test]
    fn test_server_event_round_result_duel_round_trip() {
        let event = ServerEvent::RoundResult {
            session_id: SessionId("abc".into()),
            round: 1,
            your_move: Move::Attack,
            opponent_move: Move::Mana,
            outcome: RoundOutcome::Duel {
                your_effects: SideEffects { damage: false, mana_gained: false },
                opponent_effects: SideEffects { damage: true, mana_gained: true },
                your_state: DuelistState { damage_taken: 0, mana: 0 },
                opponent_state: DuelistState { damage_taken: 1, mana: 1 },
            },
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_server_event_roster_round_trip() {
        let event = ServerEvent::Roster {
            players: vec![
                PlayerInfo { endpoint: EndpointId(1), name: "Player 1".into(), x: 30.0, y: 40.0 },
                PlayerInfo { endpoint: EndpointId(2), name: "ada".into(), x: 100.0, y: 200.0 },
            ],
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_server_event_error_json_format() {
        let event = ServerEvent::Error {
            code: 422,
            message: "move not in ruleset".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "Error");
        assert_eq!(json["code"], 422);
        assert_eq!(json["message"], "move not in ruleset");
    }

    #[test]
    fn test_verdict_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Verdict::You).unwrap(), "\"you\"");
        assert_eq!(serde_json::to_string(&Verdict::Tie).unwrap(), "\"tie\"");
    }

    // =====================================================================
    // Error cases — malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ClientEvent, _> = serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_event_type_returns_error() {
        let unknown = r#"{"type": "FlyToMoon", "speed": 9000}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_move_with_bad_alphabet_returns_error() {
        // A well-formed Move event carrying an out-of-alphabet string
        // fails at decode, so a garbage move never reaches a session.
        let bad = r#"{"type": "Move", "session_id": "s1", "move": "dynamite"}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(bad);
        assert!(result.is_err());
    }
}
