//! Tests for sequencing rounds through a session runner.

use chrono::{DateTime, TimeDelta, Utc};
use satama_core::{
    Accuracy, ActiveRound, Answer, Coordinate, Difficulty, GameError, Harbor, HintLadder,
    HintPayload, HintPolicy, HintStep, LocationRound, LocationScoring, RoundId, RoundKind,
    RoundMix, Rules, SessionConfig, SessionId, SessionRunner, SessionStatus, TriviaQuestion, geo,
};

const HELSINKI: (f64, f64) = (60.1699, 24.9384);

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(secs)
}

fn helsinki() -> Harbor {
    Harbor::new(
        "helsinki".into(),
        "Helsinki South Harbour".to_string(),
        Coordinate::new(HELSINKI.0, HELSINKI.1).unwrap(),
        Difficulty::Medium,
        Vec::new(),
    )
}

fn question() -> TriviaQuestion {
    TriviaQuestion::new(
        "q-ferry".into(),
        "Which city has a ferry line to Helsinki?".to_string(),
        vec![
            Answer::new("tallinn".into(), "Tallinn".to_string(), true),
            Answer::new("oslo".into(), "Oslo".to_string(), false),
        ],
        Difficulty::Medium,
    )
}

fn three_hint_rules() -> Rules {
    Rules::default().with_hints(
        HintPolicy::default()
            .with_zoom_levels(vec![5, 7])
            .with_base_penalty(40)
            .with_penalty_step(30)
            .with_region_overlay(true),
    )
}

fn start(config: SessionConfig, rules: Rules) -> SessionRunner {
    SessionRunner::start(
        SessionId::from(42),
        None,
        &config.with_seed(7),
        vec![helsinki()],
        vec![question()],
        rules,
        at(0),
    )
    .expect("session should start")
}

fn active_id(runner: &SessionRunner) -> RoundId {
    runner
        .current_round()
        .map(ActiveRound::id)
        .expect("a round should be active")
}

#[test]
fn test_exact_guess_scores_max() {
    let config = SessionConfig::default()
        .with_round_count(1)
        .with_mix(RoundMix::LocationOnly);
    let mut runner = start(config, Rules::default());

    let round = active_id(&runner);
    let result = runner
        .submit_guess(round, Coordinate::new(HELSINKI.0, HELSINKI.1).unwrap(), at(4))
        .unwrap();

    assert_eq!(*result.score(), 1000);
    assert_eq!(*runner.session().status(), SessionStatus::Completed);
    assert!(runner.current_round().is_none());
}

#[test]
fn test_fifty_km_guess_scores_strictly_between() {
    let config = SessionConfig::default()
        .with_round_count(1)
        .with_mix(RoundMix::LocationOnly);
    let mut runner = start(config, Rules::default());

    let harbor = *helsinki().position();
    let guess = geo::destination(harbor, 200.0, 50_000.0);
    assert!((geo::distance(guess, harbor) - 50_000.0).abs() < 1.0);

    let result = runner.submit_guess(active_id(&runner), guess, at(4)).unwrap();
    assert!(*result.score() > 0 && *result.score() < 1000, "got {}", result.score());
}

#[test]
fn test_hints_until_exhausted_then_guess() {
    let ladder = HintLadder::new(vec![
        HintStep::new(0, HintPayload::Zoom { level: 6 }, 25),
        HintStep::new(1, HintPayload::Zoom { level: 9 }, 50),
        HintStep::new(2, HintPayload::Text { clue: "Capital city".to_string() }, 100),
    ])
    .unwrap();
    let mut round = LocationRound::present(
        RoundId::new(SessionId::from(1), 1),
        helsinki(),
        Difficulty::Medium,
        ladder,
        at(0),
    );

    let mut revealed = 0;
    loop {
        let (next, hint) = round.request_hint().unwrap();
        round = next;
        match hint {
            Some(_) => revealed += 1,
            None => break,
        }
    }
    assert_eq!(revealed, 3);
    assert_eq!(round.cumulative_penalty(), 175);

    let guessed = round.submit_guess(*helsinki().position(), at(20)).unwrap();
    let (_, result) = guessed.resolve(&LocationScoring::default()).unwrap();
    assert_eq!(*result.score(), 1000 - 175);
    assert_eq!(*result.hints_used(), 3);
}

#[test]
fn test_runner_hints_with_generated_ladder() {
    let config = SessionConfig::default()
        .with_round_count(1)
        .with_mix(RoundMix::LocationOnly);
    let mut runner = start(config, three_hint_rules());
    let round = active_id(&runner);

    let penalties: Vec<u32> = std::iter::from_fn(|| runner.request_hint(round).unwrap())
        .map(|h| *h.penalty())
        .collect();
    assert_eq!(penalties, [40, 70, 100]);

    let result = runner
        .submit_guess(round, *helsinki().position(), at(9))
        .unwrap();
    assert_eq!(*result.score(), 1000 - 210);
}

#[test]
fn test_trivia_scores() {
    let config = SessionConfig::default()
        .with_round_count(2)
        .with_mix(RoundMix::TriviaOnly);
    let mut runner = start(config, Rules::default());

    let first = active_id(&runner);
    let result = runner.submit_answer(first, "tallinn".into(), at(0)).unwrap();
    assert_eq!(*result.score(), 1000);

    let second = active_id(&runner);
    assert_eq!(second.ordinal(), 2);
    let result = runner.submit_answer(second, "oslo".into(), at(1)).unwrap();
    assert_eq!(*result.score(), 0);
    assert_eq!(*runner.session().total_score(), 1000);
}

#[test]
fn test_resolving_twice_fails() {
    let config = SessionConfig::default()
        .with_round_count(2)
        .with_mix(RoundMix::LocationOnly);
    let mut runner = start(config, Rules::default());
    let round = active_id(&runner);
    let spot = *helsinki().position();

    runner.submit_guess(round, spot, at(1)).unwrap();
    assert!(matches!(
        runner.submit_guess(round, spot, at(2)),
        Err(GameError::InvalidRoundState { .. })
    ));
    assert!(runner.request_hint(round).is_err());
    assert_eq!(runner.session().rounds_played(), 1);
}

#[test]
fn test_wrong_round_kind_operation_fails() {
    let config = SessionConfig::default()
        .with_round_count(2)
        .with_mix(RoundMix::Alternating);
    let mut runner = start(config, Rules::default());
    let round = active_id(&runner);
    assert!(runner.submit_answer(round, "tallinn".into(), at(1)).is_err());
    assert!(matches!(
        runner.current_round(),
        Some(ActiveRound::Location(_))
    ));
}

#[test]
fn test_streak_over_five_rounds() {
    let config = SessionConfig::default()
        .with_round_count(5)
        .with_mix(RoundMix::LocationOnly)
        .with_streak_threshold(500);
    let mut runner = start(config, Rules::default());
    let harbor = *helsinki().position();
    let far_away = Coordinate::new(-33.86, 151.21).unwrap();

    let mut streaks = Vec::new();
    for (i, guess) in [harbor, harbor, harbor, far_away].into_iter().enumerate() {
        let round = active_id(&runner);
        runner.submit_guess(round, guess, at(i as i64 + 1)).unwrap();
        streaks.push(*runner.session().streak());
    }

    assert_eq!(streaks, [1, 2, 3, 0]);
    assert_eq!(*runner.session().best_streak(), 3);
    assert_eq!(*runner.session().status(), SessionStatus::InProgress);
}

#[test]
fn test_trivia_timeout_resolves_round() {
    let config = SessionConfig::default()
        .with_round_count(1)
        .with_mix(RoundMix::TriviaOnly);
    let mut runner = start(config, Rules::default());

    assert!(runner.expire(at(10)).unwrap().is_none());
    let result = runner.expire(at(30)).unwrap().expect("timed out");
    assert_eq!(*result.score(), 0);
    assert!(matches!(
        result.accuracy(),
        Accuracy::Answer { correct: false, timed_out: true }
    ));
    assert!(runner.session().is_completed());
}

#[test]
fn test_end_discards_active_round() {
    let config = SessionConfig::default()
        .with_round_count(3)
        .with_mix(RoundMix::LocationOnly);
    let mut runner = start(config, Rules::default());
    let round = active_id(&runner);
    runner.submit_guess(round, *helsinki().position(), at(1)).unwrap();
    let next = active_id(&runner);
    runner.request_hint(next).unwrap();

    let session = runner.end(at(5));
    assert_eq!(session.rounds_played(), 1);
    assert_eq!(*session.total_score(), 1000);
    assert!(session.is_completed());
}

#[test]
fn test_missing_content_aborts_start() {
    let config = SessionConfig::default().with_mix(RoundMix::Alternating);
    let result = SessionRunner::start(
        SessionId::from(1),
        None,
        &config,
        vec![helsinki()],
        Vec::new(),
        Rules::default(),
        at(0),
    );
    assert!(matches!(
        result,
        Err(GameError::CatalogEmpty { kind: RoundKind::Trivia, .. })
    ));
}

#[test]
fn test_location_only_session_ignores_missing_trivia() {
    let config = SessionConfig::default().with_mix(RoundMix::LocationOnly);
    let result = SessionRunner::start(
        SessionId::from(1),
        None,
        &config,
        vec![helsinki()],
        Vec::new(),
        Rules::default(),
        at(0),
    );
    assert!(result.is_ok());
}

#[test]
fn test_unusable_rules_are_rejected_before_any_round() {
    let flat = Rules::default().with_location(LocationScoring::default().with_decay_scale_m(0.0));
    let result = SessionRunner::start(
        SessionId::from(43),
        None,
        &SessionConfig::default().with_mix(RoundMix::LocationOnly),
        vec![helsinki()],
        Vec::new(),
        flat,
        at(0),
    );
    assert!(matches!(result, Err(GameError::InvalidInput(_))));
}
