use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use arcade_core::game_trait::GamePhase;
use arcade_core::progress::ProgressSink;

use crate::driver::{Driver, DriverEvent};

/// Commands sent from the front end to the frame loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Serialized game-specific input.
    Input(Vec<u8>),
    Pause,
    Resume,
    Restart,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    ChannelClosed,
    TimeLimit,
}

/// Broadcasts from the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Frame {
        tick: u64,
        phase: GamePhase,
        score: i64,
        state: Vec<u8>,
    },
    Ended {
        level: u32,
        score: i64,
        phase: GamePhase,
    },
    Advanced {
        level: u32,
        score: i64,
    },
    /// The loop has exited; nothing follows.
    Stopped(StopReason),
}

impl From<DriverEvent> for SessionEvent {
    fn from(ev: DriverEvent) -> Self {
        match ev {
            DriverEvent::Ended { phase, level, score } => SessionEvent::Ended { level, score, phase },
            DriverEvent::Advanced { level, score } => SessionEvent::Advanced { level, score },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub tick_rate_hz: f32,
    /// Minutes of play before the loop stops on its own. Zero is unlimited.
    pub play_time_limit_min: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            play_time_limit_min: 0,
        }
    }
}

/// Channels and task for a running session. The task hands the progress
/// sink back when the loop exits.
pub struct SessionHandle<P> {
    pub commands: mpsc::UnboundedSender<SessionCommand>,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    pub task: JoinHandle<P>,
}

/// Spawn a frame loop for `driver` as a tokio task.
pub fn spawn_session<P>(driver: Driver, progress: P, config: SessionConfig) -> SessionHandle<P>
where
    P: ProgressSink + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_frame_loop(driver, progress, config, cmd_rx, event_tx));
    SessionHandle {
        commands: cmd_tx,
        events: event_rx,
        task,
    }
}

async fn run_frame_loop<P: ProgressSink>(
    mut driver: Driver,
    mut progress: P,
    config: SessionConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
) -> P {
    let tick_rate = if config.tick_rate_hz > 0.0 { config.tick_rate_hz } else { 60.0 };
    let mut interval = tokio::time::interval(Duration::from_secs_f32(1.0 / tick_rate));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let start = tokio::time::Instant::now();
    let mut tick: u64 = 0;

    let reason = loop {
        tokio::select! {
            _ = interval.tick() => {
                tick += 1;
                let now_ms = start.elapsed().as_secs_f64() * 1000.0;
                let before = driver.phase();
                if let Some(ev) = driver.frame(now_ms, &mut progress) {
                    let _ = event_tx.send(ev.into());
                }
                if driver.phase() != before {
                    tracing::debug!(
                        game = %driver.id(),
                        from = before.as_str(),
                        to = driver.phase().as_str(),
                        "Phase changed"
                    );
                }
                let _ = event_tx.send(SessionEvent::Frame {
                    tick,
                    phase: driver.phase(),
                    score: driver.score(),
                    state: driver.serialize_state(),
                });
                if driver.time_limit_reached(config.play_time_limit_min) {
                    tracing::info!(
                        game = %driver.id(),
                        limit_min = config.play_time_limit_min,
                        "Play time limit reached"
                    );
                    break StopReason::TimeLimit;
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Input(bytes)) => driver.apply_input(&bytes),
                    Some(SessionCommand::Pause) => driver.pause(),
                    Some(SessionCommand::Resume) => driver.resume(),
                    Some(SessionCommand::Restart) => driver.restart(),
                    Some(SessionCommand::Stop) => break StopReason::Requested,
                    None => break StopReason::ChannelClosed,
                }
            }
        }
    };

    tracing::info!(game = %driver.id(), ?reason, ticks = tick, "Session stopped");
    drop(driver);
    let _ = event_tx.send(SessionEvent::Stopped(reason));
    progress
}
