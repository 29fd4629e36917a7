//! Frame loop tests: commands in, frames and lifecycle events out.

use std::time::Duration;

use arcade_core::game_registry::GameId;
use arcade_core::game_trait::GamePhase;

use arcade_host::{
    ArcadeStore, Driver, DriverConfig, GameRegistry, SessionCommand, SessionConfig, SessionEvent,
    SessionHandle, StopReason, spawn_session,
};
use arcade_mash::MashInput;

fn start(id: GameId, config: DriverConfig) -> SessionHandle<ArcadeStore> {
    let driver =
        Driver::new(&GameRegistry::new(), id, 1, arcade_core::sound::silent(), config).unwrap();
    spawn_session(driver, ArcadeStore::in_memory(), SessionConfig::default())
}

fn input(i: MashInput) -> SessionCommand {
    SessionCommand::Input(rmp_serde::to_vec(&i).unwrap())
}

/// Receive events until one matches, or give up after `timeout`.
async fn wait_for(
    handle: &mut SessionHandle<ArcadeStore>,
    timeout: Duration,
    pred: impl Fn(&SessionEvent) -> bool,
) -> Option<SessionEvent> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match tokio::time::timeout_at(deadline, handle.events.recv()).await {
            Ok(Some(ev)) if pred(&ev) => return Some(ev),
            Ok(Some(_)) => continue,
            _ => return None,
        }
    }
}

#[tokio::test]
async fn frames_carry_state_and_score() {
    let mut handle = start(GameId::Mash, DriverConfig::default());
    handle.commands.send(input(MashInput::Start)).unwrap();
    for _ in 0..4 {
        handle.commands.send(input(MashInput::Mash)).unwrap();
    }

    let frame = wait_for(&mut handle, Duration::from_secs(2), |ev| {
        matches!(ev, SessionEvent::Frame { score: 4, .. })
    })
    .await
    .expect("frame with score");
    match frame {
        SessionEvent::Frame { phase, state, tick, .. } => {
            assert_eq!(phase, GamePhase::Playing);
            assert!(tick >= 1);
            let decoded: arcade_mash::MashState = rmp_serde::from_slice(&state).unwrap();
            assert_eq!(decoded.count, 4);
        },
        other => panic!("expected frame, got {other:?}"),
    }

    handle.commands.send(SessionCommand::Stop).unwrap();
    let stopped = wait_for(&mut handle, Duration::from_secs(2), |ev| {
        matches!(ev, SessionEvent::Stopped(_))
    })
    .await;
    assert_eq!(stopped, Some(SessionEvent::Stopped(StopReason::Requested)));
    let store = handle.task.await.unwrap();
    assert!(store.progress(GameId::Mash).is_none());
}

#[tokio::test]
async fn dropping_commands_stops_loop() {
    let SessionHandle {
        commands,
        mut events,
        task,
    } = start(GameId::Snake, DriverConfig::default());
    drop(commands);
    let mut last = None;
    while let Ok(Some(ev)) = tokio::time::timeout(Duration::from_secs(2), events.recv()).await {
        last = Some(ev);
    }
    assert_eq!(last, Some(SessionEvent::Stopped(StopReason::ChannelClosed)));
    let _ = task.await;
}

// Paused tokio time lets the ten-second round elapse instantly.
#[tokio::test(start_paused = true)]
async fn ended_run_lands_in_returned_store() {
    let mut handle = start(GameId::Mash, DriverConfig::default());
    handle.commands.send(input(MashInput::Start)).unwrap();
    handle.commands.send(input(MashInput::Mash)).unwrap();

    // Pausing holds time; resuming lets the round run out.
    handle.commands.send(SessionCommand::Pause).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.commands.send(SessionCommand::Resume).unwrap();

    let ended = wait_for(&mut handle, Duration::from_secs(30), |ev| {
        matches!(ev, SessionEvent::Ended { .. })
    })
    .await;
    assert_eq!(
        ended,
        Some(SessionEvent::Ended {
            level: 1,
            score: 1,
            phase: GamePhase::GameOver
        })
    );

    handle.commands.send(SessionCommand::Stop).unwrap();
    let store = handle.task.await.unwrap();
    let progress = store.progress(GameId::Mash).unwrap();
    assert_eq!(progress.best(), Some(1));
}

#[tokio::test]
async fn restart_command_resets_game() {
    let mut handle = start(GameId::Mash, DriverConfig::default());
    handle.commands.send(input(MashInput::Start)).unwrap();
    handle.commands.send(input(MashInput::Mash)).unwrap();
    wait_for(&mut handle, Duration::from_secs(2), |ev| {
        matches!(ev, SessionEvent::Frame { score: 1, .. })
    })
    .await
    .expect("mashed frame");

    handle.commands.send(SessionCommand::Restart).unwrap();
    let fresh = wait_for(&mut handle, Duration::from_secs(2), |ev| {
        matches!(
            ev,
            SessionEvent::Frame {
                phase: GamePhase::Ready,
                score: 0,
                ..
            }
        )
    })
    .await;
    assert!(fresh.is_some());
    handle.commands.send(SessionCommand::Stop).unwrap();
    let _ = handle.task.await;
}
