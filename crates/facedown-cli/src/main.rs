use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod device;

#[derive(Parser)]
#[command(name = "facedown-cli", version, about = "Facedown CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive session; stdin plays the orientation sensor
    Run(commands::run::RunArgs),
    /// Show the session a fresh start would use
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// First-run setup (camera permission for the strobe)
    Onboard {
        /// Grant camera access without prompting
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Status { json } => commands::status::run(json),
        Commands::Config { action } => commands::config::run(action),
        Commands::Onboard { yes } => commands::onboard::run(yes),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr; FACEDOWN_LOG takes an EnvFilter directive.
fn init_logging() {
    let filter = EnvFilter::try_from_env("FACEDOWN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
