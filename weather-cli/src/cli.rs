use std::{io, process::ExitCode};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tokio::sync::watch;
use tracing::debug;
use weatherly_core::{Config, FetchState, WeatherFetcher};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherly", version, about = "Current weather for any city")]
pub struct Cli {
    /// Log debug events to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,

        /// Print the weather record as JSON instead of a card.
        #[arg(long)]
        json: bool,
    },

    /// Prompt for cities until cancelled (the default).
    Interactive,

    /// Store the OpenWeatherMap API key.
    Configure {
        /// Key to store; prompted for when absent.
        #[arg(long)]
        api_key: Option<String>,

        /// Override the provider base URL.
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Print the config file location.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Show { city, json } => show(&city, json).await,
            Command::Interactive => interactive().await,
            Command::Configure { api_key, base_url } => configure(api_key, base_url),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    let cfg = Config::load()?;
    debug!(
        has_api_key = cfg.api_key.is_some(),
        base_url = ?cfg.base_url,
        "configuration loaded"
    );
    Ok(cfg)
}

async fn show(city: &str, json: bool) -> anyhow::Result<ExitCode> {
    let fetcher = WeatherFetcher::from_config(&load_config()?);
    let final_state = if json {
        fetch_quietly(&fetcher, city).await?
    } else {
        fetch_and_render(&fetcher, city).await?
    };

    match final_state {
        FetchState::Success(record) if json => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(ExitCode::SUCCESS)
        }
        FetchState::Error(message) => {
            if json {
                eprintln!("{message}");
            }
            Ok(ExitCode::FAILURE)
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}

async fn interactive() -> anyhow::Result<ExitCode> {
    let fetcher = WeatherFetcher::from_config(&load_config()?);
    render::draw(&mut io::stdout(), &fetcher.state())?;

    loop {
        let answer = tokio::task::spawn_blocking(|| {
            Text::new("City:").with_placeholder("Enter city name").prompt()
        })
        .await?;

        let city = match answer {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city name"),
        };

        fetch_and_render(&fetcher, &city).await?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Issue one request and draw every published state until a terminal one.
async fn fetch_and_render(fetcher: &WeatherFetcher, city: &str) -> anyhow::Result<FetchState> {
    let mut rx = fetcher.subscribe();
    let handle = fetcher.request_fetch(city);

    let state = loop {
        let state = rx.borrow_and_update().clone();
        render::draw(&mut io::stdout(), &state)?;
        if state.is_terminal() || !wait_for_change(&mut rx).await {
            break state;
        }
    };

    if let Some(handle) = handle {
        handle.await?;
    }
    Ok(state)
}

async fn fetch_quietly(fetcher: &WeatherFetcher, city: &str) -> anyhow::Result<FetchState> {
    if let Some(handle) = fetcher.request_fetch(city) {
        handle.await?;
    }
    Ok(fetcher.state())
}

async fn wait_for_change(rx: &mut watch::Receiver<FetchState>) -> bool {
    rx.changed().await.is_ok()
}

fn configure(api_key: Option<String>, base_url: Option<String>) -> anyhow::Result<ExitCode> {
    let mut cfg = load_config()?;

    let api_key = match api_key {
        Some(key) => key,
        None => Password::new("OpenWeatherMap API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };

    if api_key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    cfg.set_api_key(api_key);

    if let Some(base_url) = base_url {
        cfg.base_url = Some(base_url);
    }

    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(ExitCode::SUCCESS)
}
