use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::game_registry::GameId;

/// Lifecycle of a single logic instance.
///
/// `Ready` is the initial state before the first meaningful input,
/// `Playing` is the only state in which `update` has any effect, and
/// `GameOver` / `Cleared` are terminal for the instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Ready,
    Playing,
    GameOver,
    Cleared,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Cleared)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Ready => "ready",
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "gameover",
            GamePhase::Cleared => "cleared",
        }
    }
}

/// Core trait that every mini-game logic type implements.
///
/// The host owns scheduling, rendering and persistence; the game only
/// advances its own state from time deltas and discrete inputs.
pub trait ArcadeGame: Send {
    /// Static description used by the host and the menu.
    fn metadata(&self) -> GameMetadata;

    /// Advance the simulation by `delta_ms` milliseconds.
    ///
    /// Negative deltas are ignored. Deltas are not clamped here; capping
    /// large jumps after a suspend is the host's job.
    fn update(&mut self, delta_ms: f32);

    /// Decode a serialized game-specific input and apply it.
    ///
    /// Bytes that do not decode are dropped without touching state.
    fn apply_input(&mut self, input: &[u8]);

    /// Serialize the authoritative state for a renderer or a snapshot.
    fn serialize_state(&self) -> Vec<u8>;

    fn phase(&self) -> GamePhase;

    fn score(&self) -> i64;

    /// 1-based stage this instance was built for (or has reached).
    fn level(&self) -> u32;

    /// Seed the running score when the host replaces a cleared instance
    /// with the next level.
    fn carry_over_score(&mut self, _score: i64) {}

    /// Release anything that would otherwise outlive the instance.
    ///
    /// Games with a countdown halt it here; once called, the countdown
    /// never decrements again.
    fn cleanup(&mut self) {}
}

/// Game metadata for the selection screen and the host driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetadata {
    pub id: GameId,
    pub name: String,
    pub description: String,
    /// When true the host replaces a cleared instance with `level + 1`.
    pub advances_on_clear: bool,
}

/// Decode an rmp-encoded input, logging and discarding anything malformed.
pub fn decode_input<T: DeserializeOwned>(game: GameId, input: &[u8]) -> Option<T> {
    match rmp_serde::from_slice::<T>(input) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::debug!(game = %game, error = %e, "Dropped malformed input");
            None
        },
    }
}

/// Generates the `ArcadeGame` accessors that are identical across games:
/// `serialize_state`, `phase` and `level`.
///
/// Requires the implementing struct to have a `state: $StateType` field,
/// and `$StateType` to have `phase: GamePhase` and `level: u32` fields.
#[macro_export]
macro_rules! arcade_game_boilerplate {
    (state_type: $StateType:ty) => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.state).unwrap_or_default()
        }

        fn phase(&self) -> $crate::game_trait::GamePhase {
            self.state.phase
        }

        fn level(&self) -> u32 {
            self.state.level
        }
    };
}
