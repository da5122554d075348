//! CLI entry point for the evenlot rebalancer.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use evenlot::config::Config;
use evenlot::error::Error;
use evenlot::execution::{self, RunOptions};
use evenlot_broker::kite::{KiteClient, auth};

#[derive(Parser)]
#[command(name = "evenlot")]
#[command(about = "Equal-value holdings rebalancer")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Brokerage access token (falls back to EVENLOT_ACCESS_TOKEN)
    #[arg(long)]
    access_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch holdings, compute buy orders, confirm, and execute
    Run {
        /// Explicit target value per holding (defaults to the largest
        /// eligible holding's current value)
        #[arg(long)]
        target: Option<f64>,

        /// Show the plan without executing
        #[arg(long)]
        dry_run: bool,

        /// Skip confirmation prompt (for automation/cron)
        #[arg(long)]
        force: bool,
    },

    /// Show aggregated holdings with current values
    Holdings,

    /// Check the brokerage session and margins
    Status,

    /// Exchange a request token for an access token
    Login {
        /// Request token from the login redirect
        #[arg(long)]
        request_token: Option<String>,
    },
}

fn access_token(cli_value: Option<String>) -> Result<String, Error> {
    if let Some(token) = cli_value {
        return Ok(token);
    }
    std::env::var("EVENLOT_ACCESS_TOKEN").map_err(|_| {
        Error::Config("no access token: pass --access-token or set EVENLOT_ACCESS_TOKEN".into())
    })
}

fn login(config: &Config, request_token: Option<String>) -> Result<(), Error> {
    let request_token = match request_token {
        Some(token) => token,
        None => {
            println!("Open this URL, authorize, and re-run with --request-token:");
            println!("  {}", auth::login_url(&config.credentials.api_key));
            return Ok(());
        }
    };

    let session = KiteClient::generate_session(
        &config.credentials.api_key,
        &config.credentials.api_secret,
        &request_token,
    )
    .map_err(|e| Error::Session(e.to_string()))?;

    println!("Session established for {}", session.user_id);
    println!("Export the token for subsequent commands:");
    println!("  export EVENLOT_ACCESS_TOKEN={}", session.access_token);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Run {
            target,
            dry_run,
            force,
        } => access_token(cli.access_token).and_then(|token| {
            let opts = RunOptions {
                target_value: target,
                dry_run,
                force,
            };
            execution::run(&config, &token, &opts)
        }),
        Command::Holdings => {
            access_token(cli.access_token).and_then(|token| execution::show_holdings(&config, &token))
        }
        Command::Status => {
            access_token(cli.access_token).and_then(|token| execution::check_status(&config, &token))
        }
        Command::Login { request_token } => login(&config, request_token),
    };

    if let Err(e) = result {
        match &e {
            Error::Aborted(msg) => {
                eprintln!("{msg}");
                process::exit(0);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
