use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_registry::GameId;
use arcade_core::game_trait::{ArcadeGame, GameMetadata, GamePhase, decode_input};
use arcade_core::geometry::{FIELD_HEIGHT, FIELD_WIDTH};
use arcade_core::sound::{SharedSound, Wave};
use arcade_core::timing::FixedStep;

pub const PLAYER_X: f32 = 50.0;
pub const PLAYER_RADIUS: f32 = 10.0;
pub const START_Y: f32 = 240.0;
pub const GRAVITY: f32 = 0.15;
/// Vertical velocity set by one thrust.
pub const THRUST_VELOCITY: f32 = -4.0;
pub const SLICE_WIDTH: f32 = 8.0;
/// Pixels of travel per point.
pub const DISTANCE_PER_POINT: f32 = 100.0;
const SMOOTHING: f32 = 0.1;
const RETARGET_CHANCE: f32 = 0.05;
const CEILING_RANGE: (f32, f32) = (10.0, 200.0);
const FLOOR_RANGE: (f32, f32) = (280.0, 470.0);

/// One vertical strip of cave: rock above `ceiling` and below `floor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSlice {
    pub x: f32,
    pub ceiling: f32,
    pub floor: f32,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkyNavigatorInput {
    Thrust,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyNavigatorState {
    pub phase: GamePhase,
    pub level: u32,
    pub score: i64,
    pub y: f32,
    pub velocity: f32,
    pub distance: f32,
    pub terrain: Vec<TerrainSlice>,
}

/// Drifting cave profile generator.
#[derive(Debug, Clone)]
struct CaveGenerator {
    ceiling: f32,
    floor: f32,
    ceiling_target: f32,
    floor_target: f32,
    min_gap: f32,
}

impl CaveGenerator {
    fn new(min_gap: f32) -> Self {
        Self {
            ceiling: 40.0,
            floor: FIELD_HEIGHT - 40.0,
            ceiling_target: 40.0,
            floor_target: FIELD_HEIGHT - 40.0,
            min_gap,
        }
    }

    fn next(&mut self, rng: &mut StdRng) -> (f32, f32) {
        if rng.random::<f32>() < RETARGET_CHANCE {
            self.ceiling_target = rng.random_range(CEILING_RANGE.0..CEILING_RANGE.1);
        }
        if rng.random::<f32>() < RETARGET_CHANCE {
            self.floor_target = rng.random_range(FLOOR_RANGE.0..FLOOR_RANGE.1);
        }
        self.ceiling += (self.ceiling_target - self.ceiling) * SMOOTHING;
        self.floor += (self.floor_target - self.floor) * SMOOTHING;

        if self.floor - self.ceiling < self.min_gap {
            let mid = ((self.ceiling + self.floor) / 2.0)
                .clamp(self.min_gap / 2.0, FIELD_HEIGHT - self.min_gap / 2.0);
            self.ceiling = mid - self.min_gap / 2.0;
            self.floor = mid + self.min_gap / 2.0;
        }
        (self.ceiling, self.floor)
    }
}

/// Auto-scrolling cave flight with gravity and a thrust impulse.
pub struct SkyNavigator {
    state: SkyNavigatorState,
    sound: SharedSound,
    rng: StdRng,
    stepper: FixedStep,
    cave: CaveGenerator,
}

pub fn scroll_speed(level: u32) -> f32 {
    2.0 + level as f32 * 0.1
}

/// Narrowest allowed opening at `level`.
pub fn min_gap(level: u32) -> f32 {
    (200.0 - level as f32 * 8.0).max(100.0)
}

impl SkyNavigator {
    pub fn new(sound: SharedSound, level: u32) -> Self {
        Self::with_seed(sound, level, rand::random())
    }

    pub fn with_seed(sound: SharedSound, level: u32, seed: u64) -> Self {
        let level = level.max(1);
        let mut game = Self {
            state: SkyNavigatorState {
                phase: GamePhase::Ready,
                level,
                score: 0,
                y: START_Y,
                velocity: 0.0,
                distance: 0.0,
                terrain: Vec::new(),
            },
            sound,
            rng: StdRng::seed_from_u64(seed),
            stepper: FixedStep::new(),
            cave: CaveGenerator::new(min_gap(level)),
        };
        game.extend_terrain();
        game
    }

    pub fn state(&self) -> &SkyNavigatorState {
        &self.state
    }

    /// Upward impulse. The first thrust also starts the flight.
    pub fn thrust(&mut self) {
        match self.state.phase {
            GamePhase::Ready => self.state.phase = GamePhase::Playing,
            GamePhase::Playing => {},
            _ => return,
        }
        self.state.velocity = THRUST_VELOCITY;
        let pitch = 100.0 + self.rng.random::<f32>() * 50.0;
        self.sound.play_tone(pitch, Wave::Sawtooth, 0.05);
    }

    /// Append slices until the right edge is covered.
    fn extend_terrain(&mut self) {
        let mut next_x = self
            .state
            .terrain
            .last()
            .map_or(0.0, |s| s.x + SLICE_WIDTH);
        while next_x < FIELD_WIDTH + SLICE_WIDTH {
            let (ceiling, floor) = self.cave.next(&mut self.rng);
            self.state.terrain.push(TerrainSlice {
                x: next_x,
                ceiling,
                floor,
                active: true,
            });
            next_x += SLICE_WIDTH;
        }
    }

    fn step(&mut self) {
        self.state.velocity += GRAVITY;
        self.state.y += self.state.velocity;
        let y = self.state.y;
        if y < 0.0 || y > FIELD_HEIGHT {
            self.crash();
            return;
        }

        let speed = scroll_speed(self.state.level);
        let mut crashed = false;
        for slice in &mut self.state.terrain {
            slice.x -= speed;
            if slice.x + SLICE_WIDTH < 0.0 {
                slice.active = false;
                continue;
            }
            // Only slices under the player matter.
            let near = slice.x < PLAYER_X + PLAYER_RADIUS && slice.x + SLICE_WIDTH > PLAYER_X - PLAYER_RADIUS;
            if near && (y - PLAYER_RADIUS < slice.ceiling || y + PLAYER_RADIUS > slice.floor) {
                crashed = true;
            }
        }
        self.state.terrain.retain(|s| s.active);
        self.extend_terrain();

        if crashed {
            self.crash();
            return;
        }

        self.state.distance += speed;
        let earned = (self.state.distance / DISTANCE_PER_POINT) as i64;
        if earned > self.state.score {
            self.state.score = earned;
            self.sound.play_tone(880.0, Wave::Square, 0.1);
        }
    }

    fn crash(&mut self) {
        self.sound.play_tone(55.0, Wave::Sawtooth, 0.5);
        self.state.phase = GamePhase::GameOver;
        tracing::debug!(score = self.state.score, distance = self.state.distance, "Crashed");
    }
}

impl Default for SkyNavigator {
    fn default() -> Self {
        Self::new(arcade_core::sound::silent(), 1)
    }
}

impl ArcadeGame for SkyNavigator {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            id: GameId::SkyNavigator,
            name: "Sky Navigator".to_string(),
            description: "Tap to thrust through a shifting cave.".to_string(),
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
        if let Some(SkyNavigatorInput::Thrust) = decode_input(GameId::SkyNavigator, input) {
            self.thrust();
        }
    }

    fn score(&self) -> i64 {
        self.state.score
    }

    arcade_game_boilerplate!(state_type: SkyNavigatorState);
}
