use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_registry::GameId;
use arcade_core::game_trait::{ArcadeGame, GameMetadata, GamePhase, decode_input};
use arcade_core::geometry::{Aabb, FIELD_WIDTH, clamp_center};
use arcade_core::sound::{SharedSound, Wave};
use arcade_core::timing::{FixedStep, SimClock};

pub const SHIP_Y: f32 = 420.0;
pub const SHIP_WIDTH: f32 = 30.0;
pub const SHIP_HITBOX_HEIGHT: f32 = 20.0;
pub const BULLET_SPEED: f32 = 8.0;
pub const ENEMY_BULLET_SPEED: f32 = 3.0;
/// Hold longer than this to fire a charged shot.
pub const CHARGE_TIME_MS: f64 = 1000.0;
pub const ENEMY_COLS: u32 = 6;
pub const ENEMY_SIZE: f32 = 24.0;
/// Peak horizontal displacement of the formation.
pub const SWAY_AMPLITUDE: f32 = 40.0;
const BULLET_CULL_Y: f32 = -50.0;
const ENEMY_BULLET_CULL_Y: f32 = 500.0;

/// Player shot. Charged shots are larger and pass through enemies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub charged: bool,
    pub active: bool,
}

impl Bullet {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.x, self.y, self.w, self.h)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Formation column centre before sway.
    pub home_x: f32,
    pub x: f32,
    pub y: f32,
    pub hp: u32,
    pub active: bool,
}

impl Enemy {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.x, self.y, ENEMY_SIZE, ENEMY_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyShot {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

impl EnemyShot {
    pub const W: f32 = 4.0;
    pub const H: f32 = 8.0;

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.x, self.y, Self::W, Self::H)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpaceDefenderInput {
    SetX(f32),
    StartCharge,
    ReleaseCharge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceDefenderState {
    pub phase: GamePhase,
    pub level: u32,
    pub score: i64,
    /// Ship centre.
    pub ship_x: f32,
    pub charging: bool,
    pub charge_started_ms: f64,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub enemy_shots: Vec<EnemyShot>,
}

/// Vertical shooter with a charge-and-release cannon.
pub struct SpaceDefender {
    state: SpaceDefenderState,
    sound: SharedSound,
    rng: StdRng,
    stepper: FixedStep,
    clock: SimClock,
}

pub fn formation_rows(level: u32) -> u32 {
    3 + level / 2
}

fn spawn_formation(level: u32) -> Vec<Enemy> {
    let rows = formation_rows(level);
    let mut enemies = Vec::with_capacity((rows * ENEMY_COLS) as usize);
    for r in 0..rows {
        for c in 0..ENEMY_COLS {
            let x = 40.0 + c as f32 * 40.0;
            enemies.push(Enemy {
                home_x: x,
                x,
                y: 40.0 + r as f32 * 30.0,
                hp: 1,
                active: true,
            });
        }
    }
    enemies
}

impl SpaceDefender {
    pub fn new(sound: SharedSound, level: u32) -> Self {
        Self::with_seed(sound, level, rand::random())
    }

    pub fn with_seed(sound: SharedSound, level: u32, seed: u64) -> Self {
        let level = level.max(1);
        Self {
            state: SpaceDefenderState {
                phase: GamePhase::Ready,
                level,
                score: 0,
                ship_x: FIELD_WIDTH / 2.0,
                charging: false,
                charge_started_ms: 0.0,
                bullets: Vec::new(),
                enemies: spawn_formation(level),
                enemy_shots: Vec::new(),
            },
            sound,
            rng: StdRng::seed_from_u64(seed),
            stepper: FixedStep::new(),
            clock: SimClock::new(),
        }
    }

    pub fn state(&self) -> &SpaceDefenderState {
        &self.state
    }

    /// Move the ship centre. The first move starts play.
    pub fn set_x(&mut self, x: f32) {
        match self.state.phase {
            GamePhase::Ready => self.state.phase = GamePhase::Playing,
            GamePhase::Playing => {},
            _ => return,
        }
        self.state.ship_x = clamp_center(x, SHIP_WIDTH / 2.0, FIELD_WIDTH);
    }

    pub fn start_charge(&mut self) {
        if self.state.phase != GamePhase::Playing {
            return;
        }
        self.state.charging = true;
        self.state.charge_started_ms = self.clock.now_ms();
    }

    pub fn release_charge(&mut self) {
        if self.state.phase != GamePhase::Playing || !self.state.charging {
            return;
        }
        let charged = self.clock.since(self.state.charge_started_ms) > CHARGE_TIME_MS;
        let (w, h) = if charged { (16.0, 30.0) } else { (4.0, 10.0) };
        self.state.bullets.push(Bullet {
            x: self.state.ship_x,
            y: SHIP_Y - 10.0,
            w,
            h,
            charged,
            active: true,
        });
        self.sound.play_tone(if charged { 440.0 } else { 880.0 }, Wave::Square, 0.1);
        self.state.charging = false;
    }

    fn step(&mut self) {
        for b in &mut self.state.bullets {
            b.y -= BULLET_SPEED;
            if b.y <= BULLET_CULL_Y {
                b.active = false;
            }
        }

        // One global phase from simulation time.
        let sway = SWAY_AMPLITUDE * (self.clock.now_secs().sin() as f32);
        let fire_chance = 0.001 * self.state.level as f32;
        for e in self.state.enemies.iter_mut().filter(|e| e.active) {
            e.x = e.home_x + sway;
            if self.rng.random::<f32>() < fire_chance {
                self.state.enemy_shots.push(EnemyShot {
                    x: e.x,
                    y: e.y + 15.0,
                    active: true,
                });
            }
        }

        for s in &mut self.state.enemy_shots {
            s.y += ENEMY_BULLET_SPEED;
            if s.y >= ENEMY_BULLET_CULL_Y {
                s.active = false;
            }
        }

        let mut kills = 0;
        for b in self.state.bullets.iter_mut().filter(|b| b.active) {
            for e in self.state.enemies.iter_mut().filter(|e| e.active) {
                if !b.bounds().overlaps(&e.bounds()) {
                    continue;
                }
                e.hp = e.hp.saturating_sub(1);
                if e.hp == 0 {
                    e.active = false;
                    kills += 1;
                }
                if !b.charged {
                    b.active = false;
                    break;
                }
            }
        }
        for _ in 0..kills {
            self.state.score += 100;
            self.sound.play_noise(0.1);
        }

        let ship = Aabb::from_center(self.state.ship_x, SHIP_Y, SHIP_WIDTH, SHIP_HITBOX_HEIGHT);
        let hit = self
            .state
            .enemy_shots
            .iter()
            .any(|s| s.active && s.bounds().overlaps(&ship));

        self.state.bullets.retain(|b| b.active);
        self.state.enemies.retain(|e| e.active);
        self.state.enemy_shots.retain(|s| s.active);

        if hit {
            self.sound.play_noise(0.5);
            self.state.phase = GamePhase::GameOver;
            tracing::debug!(level = self.state.level, score = self.state.score, "Ship destroyed");
        } else if self.state.enemies.is_empty() {
            self.state.phase = GamePhase::Cleared;
            self.sound.play_decide();
            tracing::debug!(level = self.state.level, score = self.state.score, "Wave cleared");
        }
    }
}

impl Default for SpaceDefender {
    fn default() -> Self {
        Self::new(arcade_core::sound::silent(), 1)
    }
}

impl ArcadeGame for SpaceDefender {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            id: GameId::SpaceDefender,
            name: "Space Defender".to_string(),
            description: "Hold to charge, release to fire. Clear the formation.".to_string(),
            advances_on_clear: true,
        }
    }

    fn update(&mut self, delta_ms: f32) {
        if self.state.phase != GamePhase::Playing || !(delta_ms > 0.0) {
            return;
        }
        self.clock.advance(delta_ms);
        for _ in 0..self.stepper.advance(delta_ms) {
            if self.state.phase != GamePhase::Playing {
                break;
            }
            self.step();
        }
    }

    fn apply_input(&mut self, input: &[u8]) {
        let Some(input) = decode_input::<SpaceDefenderInput>(GameId::SpaceDefender, input) else {
            return;
        };
        match input {
            SpaceDefenderInput::SetX(x) => self.set_x(x),
            SpaceDefenderInput::StartCharge => self.start_charge(),
            SpaceDefenderInput::ReleaseCharge => self.release_charge(),
        }
    }

    fn score(&self) -> i64 {
        self.state.score
    }

    fn carry_over_score(&mut self, score: i64) {
        self.state.score = score;
    }

    arcade_game_boilerplate!(state_type: SpaceDefenderState);
}
