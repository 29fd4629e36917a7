use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_registry::GameId;
use arcade_core::game_trait::{ArcadeGame, GameMetadata, GamePhase, decode_input};
use arcade_core::geometry::FIELD_WIDTH;
use arcade_core::sound::{SharedSound, Wave};
use arcade_core::timing::FixedStep;

pub const GRAVITY: f32 = 0.2;
pub const JUMP_VELOCITY: f32 = -6.0;
pub const MOVE_STEP: f32 = 3.0;
pub const START_X: f32 = 160.0;
pub const START_Y: f32 = 400.0;
/// Half the player's height; feet are at `y + PLAYER_HALF`.
pub const PLAYER_HALF: f32 = 10.0;
pub const PLATFORM_HEIGHT: f32 = 10.0;
/// Screen offset the camera keeps above the player.
const SCREEN_MID: f32 = 240.0;
/// Falling this far below the camera top ends the run.
const DEATH_DEPTH: f32 = 500.0;
/// Platforms this far below the camera top are dropped.
const CULL_DEPTH: f32 = 600.0;
const SPAWN_MARGIN: f32 = 50.0;
const INITIAL_PLATFORMS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndlessJumperInput {
    MoveLeft,
    MoveRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndlessJumperState {
    pub phase: GamePhase,
    pub level: u32,
    pub score: i64,
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    /// World y of the top of the screen. Decreases as the player climbs.
    pub camera_y: f32,
    /// Ordered bottom to top.
    pub platforms: Vec<Platform>,
}

/// Vertical platform hopper with wraparound sides.
pub struct EndlessJumper {
    state: EndlessJumperState,
    sound: SharedSound,
    rng: StdRng,
    stepper: FixedStep,
}

/// Platform width for `level`, narrowing to a 40 px floor.
pub fn platform_width(level: u32) -> f32 {
    (60.0 - level.saturating_sub(1) as f32 * 2.0).max(40.0)
}

impl EndlessJumper {
    pub fn new(sound: SharedSound, level: u32) -> Self {
        Self::with_seed(sound, level, rand::random())
    }

    pub fn with_seed(sound: SharedSound, level: u32, seed: u64) -> Self {
        let level = level.max(1);
        let mut rng = StdRng::seed_from_u64(seed);
        let w = platform_width(level);
        let mut platforms = Vec::with_capacity(INITIAL_PLATFORMS);
        platforms.push(Platform {
            x: 0.0,
            y: 460.0,
            w: FIELD_WIDTH,
            active: true,
        });
        for i in 1..INITIAL_PLATFORMS {
            platforms.push(Platform {
                x: rng.random::<f32>() * (FIELD_WIDTH - w),
                y: 450.0 - i as f32 * 60.0,
                w,
                active: true,
            });
        }
        Self {
            state: EndlessJumperState {
                phase: GamePhase::Ready,
                level,
                score: 0,
                x: START_X,
                y: START_Y,
                vy: 0.0,
                camera_y: 0.0,
                platforms,
            },
            sound,
            rng,
            stepper: FixedStep::new(),
        }
    }

    pub fn state(&self) -> &EndlessJumperState {
        &self.state
    }

    pub fn move_left(&mut self) {
        if self.begin_input() {
            self.state.x -= MOVE_STEP;
            if self.state.x < 0.0 {
                self.state.x = FIELD_WIDTH;
            }
        }
    }

    pub fn move_right(&mut self) {
        if self.begin_input() {
            self.state.x += MOVE_STEP;
            if self.state.x > FIELD_WIDTH {
                self.state.x = 0.0;
            }
        }
    }

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

    fn step(&mut self) {
        let s = &mut self.state;
        s.vy += GRAVITY;
        s.y += s.vy;

        // Bounce only when falling onto a platform top.
        if s.vy > 0.0 {
            let (x, y) = (s.x, s.y);
            let landed = s.platforms.iter().any(|p| {
                p.active
                    && y + PLAYER_HALF > p.y
                    && y - PLAYER_HALF < p.y + PLATFORM_HEIGHT
                    && x > p.x
                    && x < p.x + p.w
            });
            if landed {
                s.vy = JUMP_VELOCITY;
                self.sound.play_tone(330.0, Wave::Triangle, 0.1);
            }
        }

        if s.y < s.camera_y + SCREEN_MID {
            s.camera_y = s.y - SCREEN_MID;
        }

        if s.y > s.camera_y + DEATH_DEPTH {
            self.sound.play_tone(55.0, Wave::Sawtooth, 0.5);
            s.phase = GamePhase::GameOver;
            tracing::debug!(score = s.score, "Fell off");
            return;
        }

        let height = (-s.y / 10.0).floor() as i64;
        if height > s.score {
            s.score = height;
        }

        let w = platform_width(s.level);
        while let Some(top) = s.platforms.last().map(|p| p.y)
            && top > s.camera_y - SPAWN_MARGIN
        {
            let gap = 40.0 + self.rng.random::<f32>() * 40.0;
            s.platforms.push(Platform {
                x: self.rng.random::<f32>() * (FIELD_WIDTH - w),
                y: top - gap,
                w,
                active: true,
            });
        }

        let cull = s.camera_y + CULL_DEPTH;
        for p in &mut s.platforms {
            if p.y >= cull {
                p.active = false;
            }
        }
        s.platforms.retain(|p| p.active);
    }
}

impl Default for EndlessJumper {
    fn default() -> Self {
        Self::new(arcade_core::sound::silent(), 1)
    }
}

impl ArcadeGame for EndlessJumper {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            id: GameId::EndlessJumper,
            name: "Endless Jumper".to_string(),
            description: "Bounce from platform to platform and climb as high as you can."
                .to_string(),
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
        match decode_input(GameId::EndlessJumper, input) {
            Some(EndlessJumperInput::MoveLeft) => self.move_left(),
            Some(EndlessJumperInput::MoveRight) => self.move_right(),
            None => {},
        }
    }

    fn score(&self) -> i64 {
        self.state.score
    }

    arcade_game_boilerplate!(state_type: EndlessJumperState);
}
