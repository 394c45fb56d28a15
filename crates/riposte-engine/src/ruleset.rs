//! Round resolution: the pure `(move, move) → outcome` core.
//!
//! Nothing in this module touches shared state. Given two moves and a
//! ruleset tag it computes who won and what happened to each side, and
//! that is all — which is why it is the one piece of the server that is
//! unit-testable with zero setup.

use std::fmt;

use riposte_protocol::{Move, SideEffects};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Ruleset
// ---------------------------------------------------------------------------

/// The move alphabet and resolution rules for one game variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ruleset {
    /// Rock/paper/scissors: a fixed cyclic beats-relation, win counters,
    /// fixed round cap.
    Elimination,

    /// Attack/mana: symmetric per-side damage and resource effects, ends
    /// at a damage threshold.
    ResourceDuel,
}

impl Ruleset {
    /// Returns `true` if the move belongs to this ruleset's alphabet.
    pub fn allows(self, mov: Move) -> bool {
        match self {
            Self::Elimination => {
                matches!(mov, Move::Rock | Move::Paper | Move::Scissors)
            }
            Self::ResourceDuel => matches!(mov, Move::Attack | Move::Mana),
        }
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elimination => write!(f, "elimination"),
            Self::ResourceDuel => write!(f, "resource-duel"),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// One of the two sides of a round. `A` is the side whose move was passed
/// first to [`resolve`]; which participant that is, the session layer
/// decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The other side.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// The outcome of one resolved round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The winning side, if the round had one. Always `None` for
    /// resource-duel rounds (the duel is decided by accumulated damage,
    /// not per round) and for ties.
    pub winner: Option<Side>,

    /// What happened to side A this round.
    pub effects_a: SideEffects,

    /// What happened to side B this round.
    pub effects_b: SideEffects,
}

impl Resolution {
    /// The effects for the given side.
    pub fn effects(&self, side: Side) -> SideEffects {
        match side {
            Side::A => self.effects_a,
            Side::B => self.effects_b,
        }
    }
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

/// Resolves one round. Pure: no state, no side effects.
///
/// Moves outside the ruleset's alphabet are rejected before they reach a
/// session, so `resolve` normally never sees them; if it does, no rule
/// matches and the round falls through to a no-effect tie rather than a
/// panic.
pub fn resolve(a: Move, b: Move, ruleset: Ruleset) -> Resolution {
    match ruleset {
        Ruleset::Elimination => resolve_elimination(a, b),
        Ruleset::ResourceDuel => Resolution {
            winner: None,
            effects_a: duel_effects(a, b),
            effects_b: duel_effects(b, a),
        },
    }
}

/// The beats-relation for the elimination ruleset, written out as an
/// explicit table. Each move beats exactly one other move and loses to
/// the remaining one; this table IS the game, so it is spelled out rather
/// than derived.
const fn beats(attacker: Move, defender: Move) -> bool {
    matches!(
        (attacker, defender),
        (Move::Rock, Move::Scissors)
            | (Move::Paper, Move::Rock)
            | (Move::Scissors, Move::Paper)
    )
}

fn resolve_elimination(a: Move, b: Move) -> Resolution {
    let winner = if a == b {
        None
    } else if beats(a, b) {
        Some(Side::A)
    } else if beats(b, a) {
        Some(Side::B)
    } else {
        // No matching rule (out-of-alphabet move): no-effect tie.
        None
    };

    Resolution {
        winner,
        effects_a: SideEffects::default(),
        effects_b: SideEffects::default(),
    }
}

/// Effects for one side of a resource-duel round, computed from that
/// side's own move and the opponent's.
///
/// The whole variant reduces to two symmetric rules:
/// - you take a hit exactly when the opponent played `attack`
///   (charging mana does not ward it off);
/// - you gain a mana point exactly when you played `mana`.
///
/// So attack/attack damages both, mana/mana feeds both, and attack/mana
/// hits the caster while they still bank their point. Anything outside
/// the alphabet contributes nothing.
fn duel_effects(own: Move, other: Move) -> SideEffects {
    SideEffects {
        damage: matches!(other, Move::Attack),
        mana_gained: matches!(own, Move::Mana),
    }
}

// =========================================================================
// Tests
// =========================================================================
