//! Command line front end for the reviewer roulette.

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reviewer_roulette::commands::{blacklist, describe, run_spin, SettingsForm};
use reviewer_roulette::config::{AppConfig, DEFAULT_DATA_DIR};
use reviewer_roulette::models::SettingsPhase;
use reviewer_roulette::services::{GitHubClient, JsonFileStore, SettingsPipeline, SettingsStore};
use reviewer_roulette::AppError;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Reviewer Roulette: pick a random code reviewer from a repository's contributors
#[derive(Parser, Debug)]
#[command(name = "reviewer-roulette")]
#[command(about = "Pick a random code reviewer from a GitHub repository", long_about = None)]
struct Cli {
    /// Directory the settings are stored in
    #[arg(long, global = true, env = "REVIEWER_ROULETTE_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// GitHub API base URL
    #[arg(long, global = true, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Request timeout in seconds (waits indefinitely if not set)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a user and their repository's contributors and save them
    Configure {
        /// GitHub login of the repository owner
        login: String,
        /// Repository name
        repository: String,
    },
    /// Show the saved settings
    Show,
    /// Manage contributors excluded from selection
    #[command(subcommand)]
    Blacklist(BlacklistCommand),
    /// Spin the roulette and pick a reviewer
    Spin(SpinArgs),
}

#[derive(Subcommand, Debug)]
enum BlacklistCommand {
    /// Exclude contributors by login
    Add {
        #[arg(required = true)]
        logins: Vec<String>,
    },
    /// Make a blacklisted contributor selectable again
    Remove { login: String },
    /// Empty the blacklist
    Clear,
}

#[derive(Parser, Debug)]
struct SpinArgs {
    /// Spin duration in milliseconds
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Full laps before landing
    #[arg(long)]
    laps: Option<u32>,

    /// Seed for a reproducible pick
    #[arg(long)]
    seed: Option<u64>,
}

async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let config = AppConfig::default()
        .with_data_dir(cli.data_dir)
        .with_api_url(cli.api_url)
        .with_timeout_secs(cli.timeout_secs);

    let mut store = SettingsStore::restore(JsonFileStore::new(&config.data_dir));

    match cli.command {
        Commands::Configure { login, repository } => {
            let pipeline = SettingsPipeline::new(GitHubClient::new(config.github.clone())?);
            let phase = SettingsForm::new(login, repository)
                .submit(&mut store, &pipeline)
                .await;

            print!("{}", describe(store.state()));
            if phase == SettingsPhase::Failure {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Show => print!("{}", describe(store.state())),
        Commands::Blacklist(command) => {
            match command {
                BlacklistCommand::Add { logins } => {
                    let _ = blacklist::add(&mut store, &logins)?;
                }
                BlacklistCommand::Remove { login } => {
                    let _ = blacklist::remove(&mut store, &login)?;
                }
                BlacklistCommand::Clear => blacklist::clear(&mut store),
            }
            print!("{}", describe(store.state()));
        }
        Commands::Spin(args) => {
            let config = config.with_roulette(args.duration_ms, args.laps);
            let rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let shutdown = CancellationToken::new();
            let on_interrupt = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let reviewers = store.state().reviewers();
            let picked = run_spin(
                &reviewers,
                config.roulette,
                Duration::from_millis(config.frame_interval_ms),
                &shutdown,
                rng,
                std::io::stdout(),
            )
            .await?;
            println!();

            match picked {
                Some(reviewer) => println!("Reviewer: {}", reviewer.login),
                None => {
                    println!("Spin cancelled.");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            log::debug!("{:?}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
