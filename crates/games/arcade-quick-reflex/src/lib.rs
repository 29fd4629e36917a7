use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_registry::GameId;
use arcade_core::game_trait::{ArcadeGame, GameMetadata, GamePhase, decode_input};
use arcade_core::sound::{SharedSound, Wave};
use arcade_core::timing::SimClock;

pub const MIN_WAIT_MS: f32 = 2000.0;
pub const WAIT_SPREAD_MS: f32 = 3000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReflexStage {
    #[default]
    Wait,
    Go,
    Result,
    FalseStart,
}

impl ReflexStage {
    fn phase(self) -> GamePhase {
        match self {
            ReflexStage::Wait | ReflexStage::Go => GamePhase::Playing,
            ReflexStage::Result => GamePhase::Cleared,
            ReflexStage::FalseStart => GamePhase::GameOver,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuickReflexInput {
    Tap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickReflexState {
    pub phase: GamePhase,
    pub level: u32,
    pub stage: ReflexStage,
    /// Zero until a valid tap after the signal.
    pub reaction_time_ms: f64,
    pub wait_ms: f32,
    pub go_at_ms: f64,
}

/// Reaction timer: wait for the signal, then tap.
pub struct QuickReflex {
    state: QuickReflexState,
    sound: SharedSound,
    rng: StdRng,
    clock: SimClock,
}

impl QuickReflex {
    pub fn new(sound: SharedSound, level: u32) -> Self {
        Self::with_seed(sound, level, rand::random())
    }

    pub fn with_seed(sound: SharedSound, level: u32, seed: u64) -> Self {
        let mut game = Self {
            state: QuickReflexState {
                phase: GamePhase::Playing,
                level: level.max(1),
                stage: ReflexStage::Wait,
                reaction_time_ms: 0.0,
                wait_ms: 0.0,
                go_at_ms: 0.0,
            },
            sound,
            rng: StdRng::seed_from_u64(seed),
            clock: SimClock::new(),
        };
        game.reset();
        game
    }

    pub fn state(&self) -> &QuickReflexState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.set_stage(ReflexStage::Wait);
        self.state.reaction_time_ms = 0.0;
        self.state.wait_ms = MIN_WAIT_MS + self.rng.random::<f32>() * WAIT_SPREAD_MS;
        self.state.go_at_ms = 0.0;
    }

    pub fn tap(&mut self) {
        match self.state.stage {
            ReflexStage::Wait => {
                self.set_stage(ReflexStage::FalseStart);
                self.sound.play_noise(0.5);
                tracing::debug!("False start");
            },
            ReflexStage::Go => {
                self.state.reaction_time_ms = self.clock.since(self.state.go_at_ms);
                self.set_stage(ReflexStage::Result);
                self.sound.play_decide();
                tracing::debug!(reaction_ms = self.state.reaction_time_ms, "Reaction measured");
            },
            ReflexStage::Result | ReflexStage::FalseStart => {},
        }
    }

    fn set_stage(&mut self, stage: ReflexStage) {
        self.state.stage = stage;
        self.state.phase = stage.phase();
    }
}

impl Default for QuickReflex {
    fn default() -> Self {
        Self::new(arcade_core::sound::silent(), 1)
    }
}

impl ArcadeGame for QuickReflex {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            id: GameId::QuickReflex,
            name: "Quick Reflex".to_string(),
            description: "Wait for the signal, then tap as fast as you can.".to_string(),
            advances_on_clear: false,
        }
    }

    fn update(&mut self, delta_ms: f32) {
        if self.state.phase != GamePhase::Playing || !(delta_ms > 0.0) {
            return;
        }
        self.clock.advance(delta_ms);
        if self.state.stage == ReflexStage::Wait {
            self.state.wait_ms -= delta_ms;
            if self.state.wait_ms <= 0.0 {
                self.set_stage(ReflexStage::Go);
                self.state.go_at_ms = self.clock.now_ms();
                self.sound.play_tone(1200.0, Wave::Square, 0.1);
            }
        }
    }

    fn apply_input(&mut self, input: &[u8]) {
        if let Some(QuickReflexInput::Tap) = decode_input(GameId::QuickReflex, input) {
            self.tap();
        }
    }

    /// Faster reactions score higher; nothing before a result.
    fn score(&self) -> i64 {
        if self.state.stage != ReflexStage::Result {
            return 0;
        }
        (1000.0 - self.state.reaction_time_ms).max(0.0) as i64
    }

    arcade_game_boilerplate!(state_type: QuickReflexState);
}
