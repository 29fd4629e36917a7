use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use arcade_core::game_registry::GameId;
use arcade_host::config::HostConfig;
use arcade_host::{
    ArcadeStore, Driver, DriverConfig, GameRegistry, HostError, SessionCommand, SessionConfig,
    SessionEvent, spawn_session,
};

const DEFAULT_RUN_SECS: u64 = 10;

#[derive(Parser, Debug)]
#[command(name = "arcade-host")]
#[command(about = "Run one arcade game headless and record the result")]
struct Args {
    /// Game to run, e.g. `snake` or `space-defender`
    game: GameId,

    /// Starting level
    #[arg(default_value_t = 1)]
    level: u32,

    /// Seconds to run before stopping
    #[arg(default_value_t = DEFAULT_RUN_SECS)]
    seconds: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "arcade-host failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<(), HostError> {
    let Args {
        game,
        level,
        seconds,
    } = args;

    let config = HostConfig::load();
    config.validate()?;

    let store = ArcadeStore::load(&config.store.path).with_ranking_size(config.store.ranking_size);
    let sound = store.sound_gate(arcade_core::sound::silent());
    let session_config = SessionConfig {
        tick_rate_hz: config.session.tick_rate_hz,
        play_time_limit_min: store.settings().play_time_limit_min,
    };

    let registry = GameRegistry::from_config(&config);
    let driver = Driver::new(&registry, game, level, sound, DriverConfig::from(&config.session))?;
    tracing::info!(game = %game, level, seconds, "Arcade host starting");

    let mut handle = spawn_session(driver, store, session_config);
    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                let _ = handle.commands.send(SessionCommand::Stop);
                break;
            }
            ev = handle.events.recv() => match ev {
                Some(SessionEvent::Ended { level, score, phase }) => {
                    tracing::info!(level, score, phase = phase.as_str(), "Run ended");
                },
                Some(SessionEvent::Advanced { level, score }) => {
                    tracing::info!(level, score, "Next level");
                },
                Some(SessionEvent::Stopped(reason)) => {
                    tracing::info!(?reason, "Session finished early");
                    break;
                },
                Some(SessionEvent::Frame { .. }) => {},
                None => break,
            },
        }
    }

    let store = handle
        .task
        .await
        .map_err(|e| HostError::Invalid(format!("session task failed: {e}")))?;
    store.save()?;
    Ok(())
}
