use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_registry::GameId;
use arcade_core::game_trait::{ArcadeGame, GameMetadata, GamePhase, decode_input};
use arcade_core::geometry::{FIELD_WIDTH, clamp_center};
use arcade_core::sound::{SharedSound, Wave};
use arcade_core::timing::{FRAME_MS, FixedStep};

pub const BUCKET_Y: f32 = 400.0;
pub const BUCKET_HALF_WIDTH: f32 = 30.0;
/// Vertical band around `BUCKET_Y` in which an item can be caught.
const CATCH_BAND: f32 = 20.0;
/// Horizontal reach from the bucket centre.
const CATCH_REACH: f32 = 40.0;
const MISS_Y: f32 = 500.0;
const SPAWN_Y: f32 = -20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropKind {
    Apple,
    Gem,
    Bomb,
}

impl DropKind {
    /// Points for a caught item; bombs have none.
    pub fn points(self) -> Option<i64> {
        match self {
            DropKind::Apple => Some(10),
            DropKind::Gem => Some(50),
            DropKind::Bomb => None,
        }
    }

    /// 70% apple, 20% bomb, 10% gem.
    fn from_roll(roll: f32) -> Self {
        if roll > 0.9 {
            DropKind::Gem
        } else if roll > 0.7 {
            DropKind::Bomb
        } else {
            DropKind::Apple
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallingItem {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub kind: DropKind,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CatchDropInput {
    SetX(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchDropState {
    pub phase: GamePhase,
    pub level: u32,
    pub score: i64,
    /// Bucket centre.
    pub x: f32,
    pub drops: Vec<FallingItem>,
    pub spawn_timer_ms: f32,
}

/// Falling-item catcher.
pub struct CatchDrop {
    state: CatchDropState,
    sound: SharedSound,
    rng: StdRng,
    stepper: FixedStep,
}

pub fn spawn_interval_ms(level: u32) -> f32 {
    (1500.0 - level as f32 * 100.0).max(400.0)
}

impl CatchDrop {
    pub fn new(sound: SharedSound, level: u32) -> Self {
        Self::with_seed(sound, level, rand::random())
    }

    pub fn with_seed(sound: SharedSound, level: u32, seed: u64) -> Self {
        Self {
            state: CatchDropState {
                phase: GamePhase::Ready,
                level: level.max(1),
                score: 0,
                x: FIELD_WIDTH / 2.0,
                drops: Vec::new(),
                spawn_timer_ms: 0.0,
            },
            sound,
            rng: StdRng::seed_from_u64(seed),
            stepper: FixedStep::new(),
        }
    }

    pub fn state(&self) -> &CatchDropState {
        &self.state
    }

    /// Move the bucket. The first move starts play.
    pub fn set_x(&mut self, x: f32) {
        match self.state.phase {
            GamePhase::Ready => self.state.phase = GamePhase::Playing,
            GamePhase::Playing => {},
            _ => return,
        }
        self.state.x = clamp_center(x, BUCKET_HALF_WIDTH, FIELD_WIDTH);
    }

    fn spawn(&mut self) {
        let kind = DropKind::from_roll(self.rng.random::<f32>());
        let x = 20.0 + self.rng.random::<f32>() * 280.0;
        let vy = 2.0 + self.rng.random::<f32>() * 2.0 + self.state.level as f32 * 0.2;
        self.state.drops.push(FallingItem {
            x,
            y: SPAWN_Y,
            vy,
            kind,
            active: true,
        });
    }

    fn step(&mut self) {
        self.state.spawn_timer_ms -= FRAME_MS;
        if self.state.spawn_timer_ms <= 0.0 {
            self.spawn();
            self.state.spawn_timer_ms = spawn_interval_ms(self.state.level);
        }

        let bucket_x = self.state.x;
        let mut caught = Vec::new();
        for d in self.state.drops.iter_mut().filter(|d| d.active) {
            d.y += d.vy;
            if (d.y - BUCKET_Y).abs() < CATCH_BAND && (d.x - bucket_x).abs() < CATCH_REACH {
                d.active = false;
                caught.push(d.kind);
            } else if d.y > MISS_Y {
                d.active = false;
            }
        }
        self.state.drops.retain(|d| d.active);

        for kind in caught {
            self.on_catch(kind);
            if self.state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    fn on_catch(&mut self, kind: DropKind) {
        let Some(points) = kind.points() else {
            self.sound.play_noise(0.5);
            self.state.phase = GamePhase::GameOver;
            tracing::debug!(level = self.state.level, score = self.state.score, "Caught a bomb");
            return;
        };
        self.state.score += points;
        let pitch = if kind == DropKind::Gem { 1200.0 } else { 880.0 };
        self.sound.play_tone(pitch, Wave::Square, 0.1);

        if self.state.score > i64::from(self.state.level) * 200 {
            self.state.level += 1;
            self.sound.play_decide();
        }
    }
}

impl Default for CatchDrop {
    fn default() -> Self {
        Self::new(arcade_core::sound::silent(), 1)
    }
}

impl ArcadeGame for CatchDrop {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            id: GameId::CatchDrop,
            name: "Catch Drop".to_string(),
            description: "Catch apples and gems, dodge the bombs.".to_string(),
            advances_on_clear: false,
        }
    }

    fn update(&mut self, delta_ms: f32) {
        if self.state.phase != GamePhase::Playing || !(delta_ms > 0.0) {
            return;
        }
        for _ in 0..self.stepper.advance(delta_ms) {
            if self.state.phase != GamePhase::Playing {
                break;
            }
            self.step();
        }
    }

    fn apply_input(&mut self, input: &[u8]) {
        if let Some(CatchDropInput::SetX(x)) = decode_input(GameId::CatchDrop, input) {
            self.set_x(x);
        }
    }

    fn score(&self) -> i64 {
        self.state.score
    }

    arcade_game_boilerplate!(state_type: CatchDropState);
}
