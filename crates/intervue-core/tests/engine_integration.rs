//! End-to-end interview flows: engine progression, pause/resume timing,
//! persistence round-trips, and invariant properties under random command
//! sequences.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use intervue_core::{
    Answer, Database, Difficulty, EngineOptions, Event, HeuristicScorer, InterviewEngine,
    Question, SessionStatus,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
}

fn question(order: u32, difficulty: Difficulty) -> Question {
    Question {
        id: format!("q{order}"),
        text: format!("question {order}"),
        difficulty,
        category: "react".into(),
        order,
    }
}

#[test]
fn unanswered_easy_question_times_out_into_the_medium_one() {
    let mut engine = InterviewEngine::default();
    engine
        .start_at(
            "ava@example.com",
            vec![
                question(1, Difficulty::Easy),
                question(2, Difficulty::Medium),
            ],
            t0(),
        )
        .unwrap();

    match engine.snapshot_at(t0()) {
        Event::StateSnapshot { remaining_secs, .. } => assert_eq!(remaining_secs, 20),
        other => panic!("expected snapshot, got {other:?}"),
    }

    // Tick once per simulated second; nothing fires until the budget is gone.
    let mut timeout_event = None;
    for i in 1..=20 {
        if let Some(event @ Event::QuestionTimedOut { .. }) =
            engine.tick_at(t0() + Duration::seconds(i))
        {
            timeout_event = Some((i, event));
        }
    }
    let (fired_at, _) = timeout_event.expect("timeout should fire");
    assert_eq!(fired_at, 20);

    let session = engine.session().unwrap();
    assert_eq!(session.answers[0].text, "");
    assert_eq!(session.answers[0].time_spent_secs, 20);
    assert_eq!(session.current_index, 1);
    assert_eq!(session.status, SessionStatus::InProgress);
    match engine.snapshot_at(t0() + Duration::seconds(20)) {
        Event::StateSnapshot { remaining_secs, .. } => assert_eq!(remaining_secs, 60),
        other => panic!("expected snapshot, got {other:?}"),
    }
}

#[test]
fn pause_freezes_remaining_and_accumulates_paused_time() {
    let mut engine = InterviewEngine::default();
    engine
        .start_at("ava@example.com", vec![question(1, Difficulty::Hard)], t0())
        .unwrap();

    // 75s into a 120s budget: 45s remain.
    let paused = engine.pause_at(t0() + Duration::seconds(75)).unwrap();
    match paused {
        Event::InterviewPaused { remaining_secs, .. } => assert_eq!(remaining_secs, 45),
        other => panic!("expected InterviewPaused, got {other:?}"),
    }

    // A 10s real-world gap passes before resuming.
    let resumed = engine.resume_at(t0() + Duration::seconds(85)).unwrap();
    match resumed {
        Event::InterviewResumed { remaining_secs, .. } => assert_eq!(remaining_secs, 45),
        other => panic!("expected InterviewResumed, got {other:?}"),
    }
    let timer = &engine.session().unwrap().timer;
    assert_eq!(timer.total_paused_ms, 10_000);

    // The countdown picks up where it left off.
    match engine.snapshot_at(t0() + Duration::seconds(95)) {
        Event::StateSnapshot { remaining_secs, .. } => assert_eq!(remaining_secs, 35),
        other => panic!("expected snapshot, got {other:?}"),
    }
}

#[test]
fn interview_survives_a_process_restart_mid_flight() {
    let db = Database::open_in_memory().unwrap();
    let mut engine = InterviewEngine::default();
    engine
        .start_at(
            "ava@example.com",
            vec![
                question(1, Difficulty::Easy),
                question(2, Difficulty::Medium),
            ],
            t0(),
        )
        .unwrap();
    engine
        .submit_answer_at("state lives in hooks", t0() + Duration::seconds(10))
        .unwrap();
    db.save_active_session(engine.session().unwrap()).unwrap();
    drop(engine);

    // "Reload" 30s later: same cursor, answers, and status come back, with
    // the countdown re-derived from wall clock (20s elapsed on question 2).
    let now = t0() + Duration::seconds(40);
    let restored = db
        .load_active_session(now, 24)
        .unwrap()
        .expect("restorable session");
    assert_eq!(restored.current_index, 1);
    assert_eq!(restored.answers.len(), 1);
    assert_eq!(restored.status, SessionStatus::InProgress);
    assert_eq!(restored.timer.remaining_secs(), 30);

    let mut engine = InterviewEngine::with_session(restored, EngineOptions::default());
    let event = engine
        .submit_answer_at("the event loop polls", now + Duration::seconds(5))
        .unwrap();
    assert!(matches!(event, Event::InterviewCompleted { .. }));

    // Completed sessions score, get recorded, and stop being restorable.
    let report = engine.hand_off_at(&HeuristicScorer::default(), now + Duration::seconds(5));
    let report = report.unwrap();
    assert_eq!(report.per_question.len(), 2);
    let session = engine.session().unwrap();
    assert_eq!(session.status, SessionStatus::AwaitingEvaluation);
    db.record_interview(session, Some(&report)).unwrap();
    db.save_active_session(session).unwrap();
    assert!(db
        .load_active_session(now + Duration::seconds(10), 24)
        .unwrap()
        .is_none());
    assert_eq!(db.stats().unwrap().total_interviews, 1);
}

#[test]
fn a_day_old_paused_session_is_not_offered_for_resumption() {
    let db = Database::open_in_memory().unwrap();
    let mut engine = InterviewEngine::default();
    engine
        .start_at("ava@example.com", vec![question(1, Difficulty::Hard)], t0())
        .unwrap();
    engine.pause_at(t0() + Duration::minutes(2)).unwrap();
    db.save_active_session(engine.session().unwrap()).unwrap();

    let restored = db.load_active_session(t0() + Duration::hours(25), 24).unwrap();
    assert!(restored.is_none());
}

#[test]
fn every_question_gets_exactly_one_answer_when_nobody_shows_up() {
    let mut engine = InterviewEngine::default();
    let questions = vec![
        question(1, Difficulty::Easy),
        question(2, Difficulty::Easy),
        question(3, Difficulty::Medium),
    ];
    engine.start_at("ghost@example.com", questions, t0()).unwrap();

    // Walk the clock far enough that everything expires, one tick at a time.
    let mut now = t0();
    let mut completed = false;
    for _ in 0..200 {
        now += Duration::seconds(1);
        if let Some(Event::InterviewCompleted { timed_out_answers, .. }) = engine.tick_at(now) {
            assert_eq!(timed_out_answers, 3);
            completed = true;
            break;
        }
    }
    assert!(completed);
    let session = engine.session().unwrap();
    assert_eq!(session.answers.len(), 3);
    assert!(session.answers.iter().all(|a| a.is_timeout()));
    // 20 + 20 + 60 seconds of budget, consumed back to back.
    assert_eq!(session.end_time, Some(t0() + Duration::seconds(100)));
}

// ── Invariant properties ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Command {
    Submit,
    TimeUp,
    Pause,
    Resume,
    Tick,
}

fn command_strategy() -> impl Strategy<Value = (Command, i64)> {
    (0..5u8, 1..90i64).prop_map(|(c, dt)| {
        let command = match c {
            0 => Command::Submit,
            1 => Command::TimeUp,
            2 => Command::Pause,
            3 => Command::Resume,
            _ => Command::Tick,
        };
        (command, dt)
    })
}

proptest! {
    /// Whatever order commands arrive in, the structural invariants hold:
    /// the cursor and answer list never outgrow the question list, the
    /// answer list stays parallel to the cursor while in progress, and the
    /// paused-time total never decreases.
    #[test]
    fn invariants_hold_under_arbitrary_command_sequences(
        commands in proptest::collection::vec(command_strategy(), 1..60)
    ) {
        let mut engine = InterviewEngine::default();
        let questions = vec![
            question(1, Difficulty::Easy),
            question(2, Difficulty::Easy),
            question(3, Difficulty::Medium),
        ];
        engine.start_at("prop@example.com", questions, t0()).unwrap();

        let mut now = t0();
        let mut last_total_paused = 0u64;

        for (command, dt) in commands {
            now += Duration::seconds(dt);
            let _ = match command {
                Command::Submit => engine.submit_answer_at("an answer", now).map(Some),
                Command::TimeUp => engine.time_up_at(now).map(Some),
                Command::Pause => engine.pause_at(now).map(Some),
                Command::Resume => engine.resume_at(now).map(Some),
                Command::Tick => Ok(engine.tick_at(now)),
            };

            let session = engine.session().unwrap();
            prop_assert!(session.answers.len() <= session.questions.len());
            prop_assert!(session.current_index <= session.questions.len());
            match session.status {
                SessionStatus::InProgress | SessionStatus::Paused => {
                    prop_assert_eq!(session.answers.len(), session.current_index);
                }
                SessionStatus::Completed | SessionStatus::AwaitingEvaluation => {
                    prop_assert_eq!(session.answers.len(), session.questions.len());
                }
                SessionStatus::NotStarted => {}
            }
            prop_assert!(session.timer.total_paused_ms >= last_total_paused);
            last_total_paused = session.timer.total_paused_ms;

            // Recorded answers never exceed their question's budget.
            for (answer, q) in session.answers.iter().zip(&session.questions) {
                prop_assert!(answer.time_spent_secs <= q.time_limit_secs());
            }
        }
    }

    /// A serialize/deserialize round-trip inside the staleness window
    /// preserves cursor, answers, and status exactly.
    #[test]
    fn persisted_sessions_round_trip(answer_secs in 1..19i64) {
        let db = Database::open_in_memory().unwrap();
        let mut engine = InterviewEngine::default();
        engine.start_at(
            "prop@example.com",
            vec![question(1, Difficulty::Easy), question(2, Difficulty::Hard)],
            t0(),
        ).unwrap();
        engine
            .submit_answer_at("first", t0() + Duration::seconds(answer_secs))
            .unwrap();

        let before = engine.session().unwrap().clone();
        db.save_active_session(&before).unwrap();
        let after = db
            .load_active_session(t0() + Duration::minutes(10), 24)
            .unwrap()
            .expect("restorable");

        prop_assert_eq!(after.current_index, before.current_index);
        prop_assert_eq!(after.status, before.status);
        prop_assert_eq!(after.answers.len(), before.answers.len());
        prop_assert_eq!(
            after.answers.iter().map(|a| a.text.clone()).collect::<Vec<_>>(),
            before.answers.iter().map(|a| a.text.clone()).collect::<Vec<_>>()
        );
    }
}

#[test]
fn answers_are_distinguishable_from_not_yet_answered() {
    // An empty answer is a real answer; "not yet answered" is only visible
    // as the answer list being shorter than the cursor's question.
    let mut engine = InterviewEngine::default();
    engine
        .start_at(
            "ava@example.com",
            vec![
                question(1, Difficulty::Easy),
                question(2, Difficulty::Easy),
            ],
            t0(),
        )
        .unwrap();
    engine.time_up_at(t0() + Duration::seconds(20)).unwrap();

    let session = engine.session().unwrap();
    let answered: Vec<&Answer> = session.answers.iter().collect();
    assert_eq!(answered.len(), 1);
    assert!(answered[0].is_timeout());
    assert_eq!(session.current_index, 1);
    assert!(session.answers.get(session.current_index).is_none());
}
