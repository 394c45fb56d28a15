//! Live duel sessions and the store that owns them.
//!
//! A [`Session`] is the unit of play between exactly two endpoints: the
//! pending-move buffer for the current round, the round counter, and the
//! ruleset-specific progress (win scores or duelist damage/mana). The
//! [`SessionStore`] maps session ids to sessions; a session exists in the
//! store iff both participants are connected and no end condition has
//! been reached.

use std::collections::HashMap;

use rand::Rng;
use riposte_protocol::{DuelistState, EndpointId, Move, SessionId};
use tracing::debug;

use crate::config::EngineConfig;
use crate::ruleset::{Resolution, Ruleset, Side};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Ruleset-specific cumulative state, initialized at session creation.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionProgress {
    /// Elimination: rounds-won counter per participant.
    Scores(HashMap<EndpointId, u32>),

    /// Resource duel: damage taken and mana banked per participant.
    Duel(HashMap<EndpointId, DuelistState>),
}

/// One two-player session.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,

    /// Fixed at creation, order never changes. `participants[0]` is
    /// [`Side::A`] for resolution purposes.
    participants: [EndpointId; 2],

    /// Join metadata, carried for the session's lifetime so `Started`
    /// can show each side the other's.
    metadata: HashMap<EndpointId, serde_json::Value>,

    /// Moves for the current round only. At most two entries; cleared
    /// atomically with round advancement. Resubmission overwrites.
    pending: HashMap<EndpointId, Move>,

    /// 1-based; the round currently being played.
    round: u32,

    progress: SessionProgress,
}

impl Session {
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn participants(&self) -> [EndpointId; 2] {
        self.participants
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn progress(&self) -> &SessionProgress {
        &self.progress
    }

    /// Returns `true` if the endpoint is one of the two participants.
    pub fn contains(&self, endpoint: EndpointId) -> bool {
        self.participants.contains(&endpoint)
    }

    /// The other participant, if `endpoint` is one of the two.
    pub fn opponent_of(&self, endpoint: EndpointId) -> Option<EndpointId> {
        match self.participants {
            [a, b] if a == endpoint => Some(b),
            [a, b] if b == endpoint => Some(a),
            _ => None,
        }
    }

    /// The resolution side of a participant.
    pub fn side_of(&self, endpoint: EndpointId) -> Option<Side> {
        match self.participants {
            [a, _] if a == endpoint => Some(Side::A),
            [_, b] if b == endpoint => Some(Side::B),
            _ => None,
        }
    }

    /// Join metadata for a participant, if any was supplied.
    pub fn metadata_of(&self, endpoint: EndpointId) -> Option<&serde_json::Value> {
        self.metadata.get(&endpoint)
    }

    /// Records a participant's move for the current round. A repeated
    /// submission before resolution overwrites the previous one.
    ///
    /// Returns `false` (and records nothing) for non-participants.
    pub fn record_move(&mut self, endpoint: EndpointId, mov: Move) -> bool {
        if !self.contains(endpoint) {
            return false;
        }
        self.pending.insert(endpoint, mov);
        true
    }

    /// Returns `true` when both participants have a pending move.
    pub fn both_moved(&self) -> bool {
        self.pending.len() == 2
    }

    /// Drains the pending buffer, returning the moves in participant
    /// order, or `None` (buffer untouched) if the round is incomplete.
    pub fn take_moves(&mut self) -> Option<(Move, Move)> {
        if !self.both_moved() {
            return None;
        }
        let a = self.pending.remove(&self.participants[0])?;
        let b = self.pending.remove(&self.participants[1])?;
        Some((a, b))
    }

    /// Applies a round's resolution to the cumulative progress.
    pub fn apply(&mut self, resolution: &Resolution) {
        match &mut self.progress {
            SessionProgress::Scores(scores) => {
                if let Some(side) = resolution.winner {
                    let winner = self.participants[match side {
                        Side::A => 0,
                        Side::B => 1,
                    }];
                    *scores.entry(winner).or_default() += 1;
                }
            }
            SessionProgress::Duel(states) => {
                for (i, endpoint) in self.participants.into_iter().enumerate() {
                    let effects = resolution.effects(if i == 0 { Side::A } else { Side::B });
                    let state = states.entry(endpoint).or_default();
                    if effects.damage {
                        state.damage_taken += 1;
                    }
                    if effects.mana_gained {
                        state.mana += 1;
                    }
                }
            }
        }
    }

    /// Advances to the next round. Pending moves must already be drained.
    pub fn advance_round(&mut self) {
        self.pending.clear();
        self.round += 1;
    }

    /// Returns `true` once the session's end condition holds. Checked
    /// after [`advance_round`](Self::advance_round), so for elimination
    /// `round > round_cap` means exactly `round_cap` rounds resolved.
    pub fn finished(&self, config: &EngineConfig) -> bool {
        match &self.progress {
            SessionProgress::Scores(_) => self.round > config.round_cap,
            SessionProgress::Duel(states) => states
                .values()
                .any(|state| state.damage_taken >= config.damage_cap),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Owns every live session, keyed by id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
}

impl SessionStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session for a fresh pairing and returns its id.
    ///
    /// Per-participant metadata is indexed in participant order.
    pub fn create(
        &mut self,
        participants: [EndpointId; 2],
        metadata: [Option<serde_json::Value>; 2],
        ruleset: Ruleset,
    ) -> SessionId {
        let id = random_session_id();
        debug_assert!(
            !self.sessions.contains_key(&id),
            "session id collision: {id}"
        );

        let progress = match ruleset {
            Ruleset::Elimination => SessionProgress::Scores(
                participants.iter().map(|&p| (p, 0)).collect(),
            ),
            Ruleset::ResourceDuel => SessionProgress::Duel(
                participants
                    .iter()
                    .map(|&p| (p, DuelistState::default()))
                    .collect(),
            ),
        };

        let session = Session {
            id: id.clone(),
            participants,
            metadata: participants
                .into_iter()
                .zip(metadata)
                .filter_map(|(p, m)| m.map(|m| (p, m)))
                .collect(),
            pending: HashMap::new(),
            round: 1,
            progress,
        };

        debug!(session_id = %id, ?participants, "session created");
        self.sessions.insert(id.clone(), session);
        id
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Deletes a session. Returns it if it was live.
    pub fn remove(&mut self, id: &SessionId) -> Option<Session> {
        self.sessions.remove(id)
    }

    /// Ids of every live session the endpoint participates in.
    pub fn sessions_of(&self, endpoint: EndpointId) -> Vec<SessionId> {
        self.sessions
            .values()
            .filter(|session| session.contains(endpoint))
            .map(|session| session.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// A 32-hex-char random token. The space is large enough that collisions
/// are a never-happens invariant, not a handled case.
fn random_session_id() -> SessionId {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut rng = rand::rng();
    let token: String = (0..32)
        .map(|_| HEX[rng.random_range(0..HEX.len())] as char)
        .collect();
    SessionId(token)
}

// =========================================================================
// Tests
// =========================================================================
