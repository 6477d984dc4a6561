use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "flowdeck", version, about = "Flowdeck CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flow session control
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Estimate the cost of interrupting at a given flow depth
    Cost {
        /// Current flow depth (0-100)
        depth: f64,
        /// Hourly rate in dollars
        #[arg(long, default_value_t = 50.0)]
        rate: f64,
    },
    /// Generate a re-entry plan after an interruption
    Recovery {
        /// Flow depth at the moment of interruption (0-100)
        depth: f64,
    },
    /// Pattern analysis
    Pattern {
        #[command(subcommand)]
        action: commands::pattern::PatternAction,
    },
    /// Session statistics
    Stats {
        /// Owner to aggregate for
        #[arg(long, default_value = "local")]
        owner: String,
        /// Window in days
        #[arg(long)]
        window_days: Option<i64>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action),
        Commands::Cost { depth, rate } => commands::cost::run(depth, rate),
        Commands::Recovery { depth } => commands::recovery::run(depth),
        Commands::Pattern { action } => commands::pattern::run(action),
        Commands::Stats { owner, window_days } => commands::stats::run(&owner, window_days),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
