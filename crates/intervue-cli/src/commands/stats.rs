//! Interview statistics.

use clap::Subcommand;

use intervue_core::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Aggregate statistics as JSON
    Summary,
    /// Most recent completed interviews
    Recent {
        /// How many to show
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        StatsAction::Summary => {
            let stats = db.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Recent { limit } => {
            let records = db.recent_interviews(limit)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}
