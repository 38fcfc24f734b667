#![cfg_attr(not(test), deny(clippy::unwrap_used))]
//! Administrative command line for a fitness database directory.
//!
//! Usage: `fitness-db [stats|self-check|reset]` (default `stats`).
//! The directory and file options come from the `FITNESS_*` environment
//! variables (see `fitness_db::config`).

use fitness_db::storage::Database;
use fitness_db::{DatabaseConfig, DatabaseError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Stats,
    SelfCheck,
    Reset,
}

impl Command {
    fn parse(arg: Option<&str>) -> Option<Self> {
        match arg {
            None | Some("stats") => Some(Self::Stats),
            Some("self-check") => Some(Self::SelfCheck),
            Some("reset") => Some(Self::Reset),
            Some(_) => None,
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitness_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let arg = std::env::args().nth(1);
    let Some(command) = Command::parse(arg.as_deref()) else {
        tracing::error!(
            "Unknown command '{}', expected one of: stats, self-check, reset",
            arg.unwrap_or_default()
        );
        std::process::exit(1);
    };

    let config = match DatabaseConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: data_directory={}, file_format={:?}, atomic_writes={}",
        config.data_directory.display(),
        config.file_format,
        config.atomic_writes
    );

    if let Err(e) = run(command, config) {
        tracing::error!("{command:?} failed: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command, config: DatabaseConfig) -> Result<(), DatabaseError> {
    let mut db = Database::open(config)?;

    match command {
        Command::Stats => {
            let stats = db.get_stats();
            match serde_json::to_string_pretty(&stats) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!("Failed to serialize stats: {e}"),
            }
        }
        Command::SelfCheck => {
            if db.test_persistence()? {
                println!("persistence self-check passed");
            } else {
                println!("persistence self-check FAILED");
                db.close()?;
                std::process::exit(1);
            }
        }
        Command::Reset => {
            db.clear_all_data()?;
            println!("all data cleared and fixture data restored");
        }
    }

    db.close()
}
