use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "intervue-cli", version, about = "Intervue CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interview control
    Interview {
        #[command(subcommand)]
        action: commands::interview::InterviewAction,
    },
    /// Question bank
    Questions {
        #[command(subcommand)]
        action: commands::questions::QuestionsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Interview statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Interview { action } => commands::interview::run(action),
        Commands::Questions { action } => commands::questions::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Stats { action } => commands::stats::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
