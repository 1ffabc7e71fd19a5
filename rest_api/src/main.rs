use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rest_api::{load_rest_api_config, serve};
use storage::{RecordStore, seed};

#[derive(Debug, Parser)]
#[command(name = "medirest-server", about = "Medical records REST API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (the default when no subcommand is given).
    Serve,
    /// Populate the record store with demo data.
    Seed {
        #[arg(long, default_value_t = 10)]
        patients: usize,
        #[arg(long, default_value_t = 5)]
        medications: usize,
        #[arg(long, default_value_t = 30)]
        prescriptions: usize,
        /// Delete all existing records before seeding.
        #[arg(long)]
        wipe: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_rest_api_config().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Seed {
            patients,
            medications,
            prescriptions,
            wipe,
        } => {
            let store = RecordStore::open(&config.data_directory).with_context(|| {
                format!(
                    "failed to open record store at {}",
                    config.data_directory.display()
                )
            })?;
            let report = seed::run(
                &store,
                &seed::SeedOptions {
                    patients,
                    medications,
                    prescriptions,
                    wipe,
                },
            )
            .context("seeding failed")?;
            store.flush().context("failed to flush record store")?;
            println!(
                "Created {} patients, {} medications and {} prescriptions.",
                report.patients, report.medications, report.prescriptions
            );
            Ok(())
        }
    }
}
