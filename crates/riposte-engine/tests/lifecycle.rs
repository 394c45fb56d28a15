//! Full-lifecycle tests driving the engine as a black box: connect,
//! pair, play to the end condition, disconnect.

use riposte_engine::{Engine, EngineConfig, Ruleset};
use riposte_protocol::{
    EndpointId, Move, RoundOutcome, ServerEvent, SessionId, Verdict,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};

const P1: EndpointId = EndpointId(1);
const P2: EndpointId = EndpointId(2);

fn connect(engine: &mut Engine, endpoint: EndpointId) -> UnboundedReceiver<ServerEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    engine.connect(endpoint, tx);
    rx
}

fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn round_results(events: Vec<ServerEvent>) -> Vec<ServerEvent> {
    events
        .into_iter()
        .filter(|event| matches!(event, ServerEvent::RoundResult { .. }))
        .collect()
}

struct Match {
    engine: Engine,
    rx1: UnboundedReceiver<ServerEvent>,
    rx2: UnboundedReceiver<ServerEvent>,
    session_id: SessionId,
}

impl Match {
    fn start(config: EngineConfig) -> Self {
        let mut engine = Engine::new(config);
        let mut rx1 = connect(&mut engine, P1);
        let mut rx2 = connect(&mut engine, P2);
        engine.join(P1, None);
        engine.join(P2, None);

        let session_id = drain(&mut rx1)
            .into_iter()
            .find_map(|event| match event {
                ServerEvent::Started { session_id, .. } => Some(session_id),
                _ => None,
            })
            .expect("pairing should start a session");
        drain(&mut rx2);

        Self { engine, rx1, rx2, session_id }
    }

    /// Plays one full round and returns each side's `RoundResult`.
    fn play(&mut self, move1: Move, move2: Move) -> (Vec<ServerEvent>, Vec<ServerEvent>) {
        self.engine.submit_move(P1, self.session_id.clone(), move1);
        self.engine.submit_move(P2, self.session_id.clone(), move2);
        (
            round_results(drain(&mut self.rx1)),
            round_results(drain(&mut self.rx2)),
        )
    }
}

#[test]
fn test_full_elimination_match_runs_exactly_three_rounds() {
    let mut m = Match::start(EngineConfig::default());

    // P1 wins round 1, ties round 2, loses round 3.
    let rounds = [
        (Move::Rock, Move::Scissors, Verdict::You, 1, 0),
        (Move::Paper, Move::Paper, Verdict::Tie, 1, 0),
        (Move::Scissors, Move::Rock, Verdict::Opponent, 1, 1),
    ];

    for (i, (move1, move2, verdict, score1, score2)) in rounds.into_iter().enumerate() {
        let round = i as u32 + 1;
        assert_eq!(
            m.engine.snapshot().sessions,
            1,
            "session must be live before round {round}"
        );

        let (r1, _) = m.play(move1, move2);
        assert_eq!(r1.len(), 1, "exactly one result per round");
        match &r1[0] {
            ServerEvent::RoundResult { round: r, your_move, opponent_move, outcome, .. } => {
                assert_eq!(*r, round);
                assert_eq!(*your_move, move1);
                assert_eq!(*opponent_move, move2);
                assert_eq!(
                    *outcome,
                    RoundOutcome::Score {
                        verdict,
                        your_score: score1,
                        opponent_score: score2,
                    }
                );
            }
            other => panic!("expected RoundResult, got {other:?}"),
        }
    }

    // The cap was reached: the session is gone, a 4th-round move is a
    // no-op for both sides.
    assert_eq!(m.engine.snapshot().sessions, 0);
    let (r1, r2) = m.play(Move::Rock, Move::Rock);
    assert!(r1.is_empty());
    assert!(r2.is_empty());
}

#[test]
fn test_resource_duel_ends_when_damage_reaches_the_cap() {
    let config = EngineConfig {
        ruleset: Ruleset::ResourceDuel,
        damage_cap: 2,
        ..EngineConfig::default()
    };
    let mut m = Match::start(config);

    // P1 attacks every round while P2 charges; P2's damage hits the cap
    // on round 2.
    m.play(Move::Attack, Move::Mana);
    assert_eq!(m.engine.snapshot().sessions, 1, "one hit is below the cap");

    let (_, r2) = m.play(Move::Attack, Move::Mana);
    match &r2[0] {
        ServerEvent::RoundResult { outcome: RoundOutcome::Duel { your_state, .. }, .. } => {
            assert_eq!(your_state.damage_taken, 2);
            assert_eq!(your_state.mana, 2);
        }
        other => panic!("expected duel RoundResult, got {other:?}"),
    }
    assert_eq!(m.engine.snapshot().sessions, 0, "cap reached, session deleted");
}

#[test]
fn test_resource_duel_mutual_attrition_damages_both() {
    let config = EngineConfig {
        ruleset: Ruleset::ResourceDuel,
        damage_cap: 1,
        ..EngineConfig::default()
    };
    let mut m = Match::start(config);

    let (r1, r2) = m.play(Move::Attack, Move::Attack);
    for result in [&r1[0], &r2[0]] {
        match result {
            ServerEvent::RoundResult {
                outcome: RoundOutcome::Duel { your_state, opponent_state, .. },
                ..
            } => {
                assert_eq!(your_state.damage_taken, 1);
                assert_eq!(opponent_state.damage_taken, 1);
            }
            other => panic!("expected duel RoundResult, got {other:?}"),
        }
    }
    assert_eq!(m.engine.snapshot().sessions, 0);
}

#[test]
fn test_session_ids_differ_across_pairings() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut ids = Vec::new();

    for pair in 0..3u64 {
        let a = EndpointId(pair * 2 + 1);
        let b = EndpointId(pair * 2 + 2);
        let mut rx = connect(&mut engine, a);
        connect(&mut engine, b);
        engine.join(a, None);
        engine.join(b, None);
        let id = drain(&mut rx)
            .into_iter()
            .find_map(|event| match event {
                ServerEvent::Started { session_id, .. } => Some(session_id),
                _ => None,
            })
            .expect("pairing should start a session");
        ids.push(id);
    }

    ids.sort_by(|a, b| a.0.cmp(&b.0));
    ids.dedup();
    assert_eq!(ids.len(), 3, "every pairing gets a fresh id");
}

#[test]
fn test_mid_match_disconnect_notifies_survivor_and_frees_both() {
    let mut m = Match::start(EngineConfig::default());

    // A half-played round is abandoned with the session.
    m.engine.submit_move(P1, m.session_id.clone(), Move::Rock);
    drain(&mut m.rx2);

    m.engine.disconnect(P1);
    let events = drain(&mut m.rx2);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, ServerEvent::OpponentLeft))
            .count(),
        1
    );
    assert_eq!(m.engine.snapshot().sessions, 0);

    // The survivor can queue again immediately.
    m.engine.join(P2, None);
    assert!(drain(&mut m.rx2).contains(&ServerEvent::Waiting));
}

#[test]
fn test_stale_moves_after_termination_never_revive_a_session() {
    let mut m = Match::start(EngineConfig::default());
    let session_id = m.session_id.clone();

    m.engine.disconnect(P2);
    drain(&mut m.rx1);

    m.engine.submit_move(P1, session_id.clone(), Move::Rock);
    m.engine.submit_move(P1, session_id, Move::Paper);

    assert!(drain(&mut m.rx1).is_empty(), "zero emissions");
    assert_eq!(m.engine.snapshot().sessions, 0);
}

#[test]
fn test_rejected_move_does_not_mutate_the_round() {
    let mut m = Match::start(EngineConfig::default());

    // An out-of-alphabet move must not count as P1's submission.
    m.engine.submit_move(P1, m.session_id.clone(), Move::Mana);
    drain(&mut m.rx1);
    drain(&mut m.rx2);

    // The round still needs both real moves to resolve.
    m.engine.submit_move(P2, m.session_id.clone(), Move::Rock);
    assert!(round_results(drain(&mut m.rx2)).is_empty());

    let (r1, _) = m.play(Move::Paper, Move::Rock);
    match &r1[0] {
        ServerEvent::RoundResult { round, .. } => assert_eq!(*round, 1),
        other => panic!("expected RoundResult, got {other:?}"),
    }
}
