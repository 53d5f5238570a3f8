#![forbid(unsafe_code)]

//! Rollcall CLI
//!
//! Registers contacts and reads the running total from a Rollcall API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use rollcall_client::{
    ContactForm, ContactsApi, DEFAULT_API_URL, FormController, Outcome, RollcallClient,
    spawn_count_poller,
};

/// Rollcall Command-Line Interface
#[derive(Parser, Debug)]
#[command(name = "rollcall", author, version, about, long_about = None)]
struct Args {
    /// Base URL of the Rollcall API
    #[arg(long, env = "ROLLCALL_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Register a contact
    Register {
        /// Full name
        #[arg(long)]
        name: String,
        /// Email address
        #[arg(long)]
        email: String,
        /// Phone number
        #[arg(long)]
        phone: String,
    },
    /// Show the number of registered contacts
    Count {
        /// Keep polling every N seconds
        #[arg(long, value_name = "SECONDS")]
        watch: Option<u64>,
    },
    /// Print the link to the registration sheet
    SheetUrl,
    /// Check that the API is up
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = Arc::new(RollcallClient::new(&args.api_url)?);

    match args.command {
        Command::Register { name, email, phone } => register(client, name, email, phone).await,
        Command::Count { watch: None } => {
            println!("{}", client.count().await?);
            Ok(())
        }
        Command::Count {
            watch: Some(seconds),
        } => watch_count(client, Duration::from_secs(seconds.max(1))).await,
        Command::SheetUrl => {
            let form = FormController::new(client);
            match form.open_sheet_url().await {
                Ok(url) => {
                    println!("{url}");
                    Ok(())
                }
                Err(message) => bail!(message),
            }
        }
        Command::Health => {
            let health = client.health().await?;
            println!("{} {} ({})", health.status, health.message, health.timestamp);
            Ok(())
        }
    }
}

async fn register(
    client: Arc<RollcallClient>,
    name: String,
    email: String,
    phone: String,
) -> Result<()> {
    let mut form = FormController::new(client);
    *form.form_mut() = ContactForm::new(name, email, phone);

    let outcome = form.submit().await?;
    match &outcome {
        Outcome::Success(contact) => {
            println!("{} You have been registered successfully.", outcome.message());
            println!("id: {}", contact.id);
            if let Some(total) = form.total_count() {
                println!("Total registrations: {total}");
            }
            Ok(())
        }
        Outcome::Duplicate { .. } => bail!("{} (you may already be registered)", outcome.message()),
        Outcome::Error { .. } => bail!(outcome.message()),
    }
}

async fn watch_count(client: Arc<RollcallClient>, interval: Duration) -> Result<()> {
    let mut poller = spawn_count_poller(client, interval);
    loop {
        tokio::select! {
            total = poller.changed() => match total {
                Some(total) => println!("{total}"),
                None => return Ok(()),
            },
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}
