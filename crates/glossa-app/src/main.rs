use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use glossa_core::{Registry, Session};
use glossa_dictionary::load_paths;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub mod controller;
pub mod events;
pub mod io;
pub mod profile;
pub mod state;
pub mod ui;


use self::controller::AppController;
use self::profile::ProfilePaths;
use self::state::AppState;

/// Incremental multi-dictionary word search
#[derive(Parser, Debug)]
#[command(name = "glossa", version)]
struct Args {
    /// Profile to load from the profiles directory
    #[arg(long, default_value = "main")]
    profile: String,

    /// Extra dictionary file or directory, may be repeated
    #[arg(long = "dict")]
    dictionaries: Vec<PathBuf>,

    /// Log as JSON lines
    #[arg(long)]
    json: bool,

    /// Create a profile cloned from main and exit
    #[arg(long, value_name = "NAME")]
    new_profile: Option<String>,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "glossa=info".into());

    // stdout belongs to the printer
    let (plain, json) = if json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr));
        (Some(layer), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.json);

    let paths = ProfilePaths::resolve()?;
    profile::init_user_config(&paths)?;

    if let Some(name) = &args.new_profile {
        let file = profile::add_profile_from_default(&paths, name)?;
        println!("{}", file.display());
        return Ok(());
    }

    let mut config = profile::load_user_profile(&paths, &args.profile)
        .with_context(|| format!("Failed to load profile {}", args.profile))?;
    config.dictionary.paths.extend(args.dictionaries);

    let dictionaries = if config.dictionary.enabled {
        load_paths(&config.dictionary.paths)
    } else {
        tracing::warn!("Dictionaries disabled in profile {}", args.profile);
        Vec::new()
    };
    if dictionaries.is_empty() {
        tracing::warn!("No dictionaries loaded; pass --dict <path>");
    }

    let snapshot = profile::load_session(&paths);
    let (mut session, search_rx) =
        Session::new(config.clone(), Registry::with_dictionaries(dictionaries), snapshot);
    session.restore().await;

    let shutdown_timeout = Duration::from_millis(config.shutdown_timeout_ms);
    let state = Arc::new(AppState::new(config, session, paths));
    let controller = AppController::new(state.clone());
    let mut tasks = controller.spawn_tasks(search_rx);

    tokio::select! {
        result = signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl+C")?;
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::info!("Task finished, shutting down"),
                Ok(Err(e)) => tracing::error!("Task failed: {e:#}"),
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    let drained = tokio::time::timeout(shutdown_timeout, async {
        while tasks.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        tracing::warn!("Tasks still running after {:?}, aborting", shutdown_timeout);
        tasks.abort_all();
    }

    state.save_session().await
}
