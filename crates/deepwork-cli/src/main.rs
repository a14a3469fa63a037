use clap::{Parser, Subcommand};

mod commands;
mod hooks;
mod logging;

#[derive(Parser)]
#[command(name = "deepwork", version, about = "Focus countdown and deep-work stopwatch")]
struct Cli {
    /// Log engine transitions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Focus countdown control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Deep-work stopwatch control
    Stopwatch {
        #[command(subcommand)]
        action: commands::stopwatch::StopwatchAction,
    },
    /// Weekly summary of committed minutes
    Week {
        /// Any date inside the week to show (YYYY-MM-DD), default today
        #[arg(long)]
        date: Option<String>,
    },
    /// All committed days
    Ledger,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Stopwatch { action } => commands::stopwatch::run(action),
        Commands::Week { date } => commands::week::run_week(date.as_deref()),
        Commands::Ledger => commands::week::run_ledger(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
