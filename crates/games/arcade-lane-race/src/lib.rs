use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_registry::GameId;
use arcade_core::game_trait::{ArcadeGame, GameMetadata, GamePhase, decode_input};
use arcade_core::sound::{SharedSound, Wave};
use arcade_core::timing::FixedStep;

pub const LANES: u8 = 3;
pub const CAR_TOP: f32 = 380.0;
pub const CAR_BOTTOM: f32 = 440.0;
pub const OBSTACLE_HEIGHT: f32 = 40.0;
const SPAWN_Y: f32 = -50.0;
const FIRST_OBSTACLE_Y: f32 = -400.0;
/// A new obstacle may spawn once the newest one is below this line.
const SPAWN_CLEARANCE_Y: f32 = 50.0;
const SPAWN_CHANCE: f32 = 0.02;
const CULL_Y: f32 = 600.0;
/// Level from which oil slicks join the mix.
pub const OIL_FROM_LEVEL: u32 = 5;
const OIL_CHANCE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hazard {
    Rock,
    Oil,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub lane: u8,
    /// Top edge.
    pub y: f32,
    pub hazard: Hazard,
    pub passed: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneRaceInput {
    MoveLeft,
    MoveRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneRaceState {
    pub phase: GamePhase,
    pub level: u32,
    pub score: i64,
    pub lane: u8,
    /// Obstacle fall speed in px per frame.
    pub speed: f32,
    pub obstacles: Vec<Obstacle>,
}

/// Three-lane dodger.
pub struct LaneRace {
    state: LaneRaceState,
    sound: SharedSound,
    rng: StdRng,
    stepper: FixedStep,
}

pub fn fall_speed(level: u32) -> f32 {
    5.0 + level as f32 * 0.5
}

impl LaneRace {
    pub fn new(sound: SharedSound, level: u32) -> Self {
        Self::with_seed(sound, level, rand::random())
    }

    pub fn with_seed(sound: SharedSound, level: u32, seed: u64) -> Self {
        let level = level.max(1);
        let mut game = Self {
            state: LaneRaceState {
                phase: GamePhase::Ready,
                level,
                score: 0,
                lane: 1,
                speed: fall_speed(level),
                obstacles: Vec::new(),
            },
            sound,
            rng: StdRng::seed_from_u64(seed),
            stepper: FixedStep::new(),
        };
        game.spawn(FIRST_OBSTACLE_Y);
        game
    }

    pub fn state(&self) -> &LaneRaceState {
        &self.state
    }

    pub fn move_left(&mut self) {
        if self.begin_input() && self.state.lane > 0 {
            self.state.lane -= 1;
            self.sound.play_tone(440.0, Wave::Triangle, 0.05);
        }
    }

    pub fn move_right(&mut self) {
        if self.begin_input() && self.state.lane + 1 < LANES {
            self.state.lane += 1;
            self.sound.play_tone(440.0, Wave::Triangle, 0.05);
        }
    }

    /// Lane changes start the race; returns whether input is accepted.
    fn begin_input(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Ready => {
                self.state.phase = GamePhase::Playing;
                true
            },
            GamePhase::Playing => true,
            _ => false,
        }
    }

    fn spawn(&mut self, y: f32) {
        let lane = self.rng.random_range(0..LANES);
        let oil = self.state.level >= OIL_FROM_LEVEL && self.rng.random::<f32>() < OIL_CHANCE;
        self.state.obstacles.push(Obstacle {
            lane,
            y,
            hazard: if oil { Hazard::Oil } else { Hazard::Rock },
            passed: false,
            active: true,
        });
    }

    fn step(&mut self) {
        let mut crash = None;
        for ob in self.state.obstacles.iter_mut().filter(|o| o.active) {
            ob.y += self.state.speed;

            if ob.lane == self.state.lane && ob.y + OBSTACLE_HEIGHT > CAR_TOP && ob.y < CAR_BOTTOM {
                crash = Some(ob.hazard);
                break;
            }
            if !ob.passed && ob.y > CAR_BOTTOM {
                ob.passed = true;
                self.state.score += 1;
                self.sound.play_tone(880.0, Wave::Square, 0.05);
            }
            if ob.y > CULL_Y {
                ob.active = false;
            }
        }
        self.state.obstacles.retain(|o| o.active);

        if let Some(hazard) = crash {
            if hazard == Hazard::Oil {
                self.sound.play_noise(0.2);
            }
            self.sound.play_tone(55.0, Wave::Sawtooth, 0.5);
            self.state.phase = GamePhase::GameOver;
            tracing::debug!(score = self.state.score, ?hazard, "Car crashed");
            return;
        }

        let clear = self
            .state
            .obstacles
            .last()
            .is_none_or(|o| o.y > SPAWN_CLEARANCE_Y);
        if clear && self.rng.random::<f32>() < SPAWN_CHANCE {
            self.spawn(SPAWN_Y);
        }
    }
}

impl Default for LaneRace {
    fn default() -> Self {
        Self::new(arcade_core::sound::silent(), 1)
    }
}

impl ArcadeGame for LaneRace {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            id: GameId::LaneRace,
            name: "Lane Race".to_string(),
            description: "Switch lanes to dodge rocks and oil.".to_string(),
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
        match decode_input(GameId::LaneRace, input) {
            Some(LaneRaceInput::MoveLeft) => self.move_left(),
            Some(LaneRaceInput::MoveRight) => self.move_right(),
            None => {},
        }
    }

    fn score(&self) -> i64 {
        self.state.score
    }

    arcade_game_boilerplate!(state_type: LaneRaceState);
}
