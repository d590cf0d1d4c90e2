//! Interview control: start, answer, tick, pause, resume, status, reset.
//!
//! Each invocation rehydrates the active session from the database (with
//! restore validation), applies one command, and persists the result. The
//! countdown is wall-clock based, so a `tick` from cron or a watch loop is
//! enough to enforce budgets between commands.

use chrono::Utc;
use clap::Subcommand;
use std::path::PathBuf;

use intervue_core::{
    CandidateProfile, Config, Database, Event, HeuristicScorer, InterviewEngine, QuestionBank,
    QuestionSource, SessionStatus,
};

#[derive(Subcommand)]
pub enum InterviewAction {
    /// Start a new interview for a candidate
    Start {
        /// Candidate name (used when no resume text is given)
        #[arg(long)]
        candidate: Option<String>,
        /// Plain-text resume to extract candidate contact details from
        #[arg(long)]
        resume_file: Option<PathBuf>,
        /// Seed for a reproducible question draw
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Submit an answer to the current question
    Answer {
        /// Answer text
        text: String,
    },
    /// Advance the countdown; fires the timeout when the budget is gone
    Tick,
    /// Pause the countdown
    Pause,
    /// Resume a paused interview
    Resume,
    /// Print current interview state as JSON
    Status,
    /// Discard the active interview entirely
    Reset,
}

fn load_engine(db: &Database, cfg: &Config) -> Result<InterviewEngine, Box<dyn std::error::Error>> {
    let restored = db.load_active_session(Utc::now(), cfg.session.staleness_hours)?;
    Ok(match restored {
        Some(session) => InterviewEngine::with_session(session, cfg.engine_options()),
        None => InterviewEngine::new(cfg.engine_options()),
    })
}

/// Persist the engine's session; on completion, score and record it.
fn save_engine(
    db: &Database,
    engine: &mut InterviewEngine,
    cfg: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    if engine.status() == SessionStatus::Completed {
        let report = engine.hand_off(&HeuristicScorer::new(cfg.scoring.pass_mark))?;
        if let Some(session) = engine.session() {
            db.record_interview(session, Some(&report))?;
        }
        db.clear_active_session()?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    match engine.session() {
        Some(session) => db.save_active_session(session)?,
        None => db.clear_active_session()?,
    }
    Ok(())
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

fn build_profile(
    candidate: Option<String>,
    resume_file: Option<PathBuf>,
) -> Result<CandidateProfile, Box<dyn std::error::Error>> {
    let profile = match resume_file {
        Some(path) => CandidateProfile::from_resume_text(&std::fs::read_to_string(path)?),
        None => match candidate {
            Some(name) => CandidateProfile::named(&name),
            None => CandidateProfile::default(),
        },
    };
    if !profile.is_complete() {
        eprintln!(
            "note: missing candidate fields: {}",
            profile.missing_fields().join(", ")
        );
    }
    Ok(profile)
}

pub fn run(action: InterviewAction) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();
    let db = Database::open()?;
    let mut engine = load_engine(&db, &cfg)?;

    match action {
        InterviewAction::Start {
            candidate,
            resume_file,
            seed,
        } => {
            let profile = build_profile(candidate, resume_file)?;
            let bank = match seed {
                Some(seed) => QuestionBank::with_seed(cfg.plan(), seed),
                None => QuestionBank::new(cfg.plan()),
            };
            let questions = bank.draw(&profile)?;
            let event = engine.start(&profile.display_id(), questions)?;
            print_event(&event)?;
            save_engine(&db, &mut engine, &cfg)?;
        }
        InterviewAction::Answer { text } => {
            let event = engine.submit_answer(&text)?;
            print_event(&event)?;
            save_engine(&db, &mut engine, &cfg)?;
        }
        InterviewAction::Tick => {
            match engine.tick() {
                Some(event) => print_event(&event)?,
                None => print_event(&engine.snapshot())?,
            }
            save_engine(&db, &mut engine, &cfg)?;
        }
        InterviewAction::Pause => {
            let event = engine.pause()?;
            print_event(&event)?;
            save_engine(&db, &mut engine, &cfg)?;
        }
        InterviewAction::Resume => {
            let event = engine.resume()?;
            print_event(&event)?;
            save_engine(&db, &mut engine, &cfg)?;
        }
        InterviewAction::Status => {
            print_event(&engine.snapshot())?;
        }
        InterviewAction::Reset => {
            let event = engine.reset();
            print_event(&event)?;
            save_engine(&db, &mut engine, &cfg)?;
        }
    }

    Ok(())
}
