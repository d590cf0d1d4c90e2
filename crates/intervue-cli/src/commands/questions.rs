//! Question bank inspection.

use clap::Subcommand;

use intervue_core::{CandidateProfile, Config, QuestionBank, QuestionSource};

#[derive(Subcommand)]
pub enum QuestionsAction {
    /// Draw a question set the way `interview start` would
    Draw {
        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
    },
}

pub fn run(action: QuestionsAction) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();
    match action {
        QuestionsAction::Draw { seed } => {
            let bank = match seed {
                Some(seed) => QuestionBank::with_seed(cfg.plan(), seed),
                None => QuestionBank::new(cfg.plan()),
            };
            let questions = bank.draw(&CandidateProfile::default())?;
            for q in &questions {
                println!(
                    "{:>2}. [{} / {:>3}s] ({}) {}",
                    q.order,
                    q.difficulty,
                    q.time_limit_secs(),
                    q.category,
                    q.text
                );
            }
        }
    }
    Ok(())
}
