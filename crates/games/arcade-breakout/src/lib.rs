pub mod config;
pub mod items;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_registry::GameId;
use arcade_core::game_trait::{ArcadeGame, GameMetadata, GamePhase, decode_input};
use arcade_core::geometry::{Aabb, FIELD_HEIGHT, FIELD_WIDTH, clamp_center};
use arcade_core::sound::{SharedSound, Wave};
use arcade_core::timing::{FixedStep, SimClock};

use config::BreakoutConfig;
use items::{
    ITEM_FALL_SPEED, Item, ItemKind, LASER_HEIGHT, LASER_SPEED, Laser,
};

pub const PADDLE_WIDTH: f32 = 60.0;
pub const PADDLE_MIN_WIDTH: f32 = 30.0;
pub const PADDLE_MAX_WIDTH: f32 = 120.0;
pub const PADDLE_HEIGHT: f32 = 10.0;
pub const PADDLE_Y: f32 = 450.0;
pub const BALL_RADIUS: f32 = 4.0;
/// Height at which a fresh ball rests above the paddle.
const BALL_REST_Y: f32 = 430.0;

pub const BRICK_ROWS: usize = 5;
pub const BRICK_COLS: usize = 8;
pub const BRICK_WIDTH: f32 = FIELD_WIDTH / BRICK_COLS as f32;
pub const BRICK_HEIGHT: f32 = 15.0;
const BRICK_TOP: f32 = 40.0;
const BRICK_GAP: f32 = 2.0;

/// Horizontal velocity per pixel of offset from the paddle centre.
const PADDLE_DEFLECT: f32 = 0.15;
const MIN_BALL_SPEED: f32 = 1.0;
const MAX_BALL_SPEED: f32 = 12.0;
/// Multi stops forking beyond this many balls.
pub const MAX_BALLS: usize = 81;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickKind {
    Normal,
    Hard,
    Boss,
}

impl BrickKind {
    pub fn points(self) -> i64 {
        match self {
            BrickKind::Normal => 10,
            BrickKind::Hard => 50,
            BrickKind::Boss => 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: BrickKind,
    pub hp: u32,
    pub active: bool,
}

impl Brick {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    /// Apply one point of damage. Returns true when this hit destroyed it.
    fn hit(&mut self) -> bool {
        self.hp = self.hp.saturating_sub(1);
        if self.hp == 0 {
            self.active = false;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub active: bool,
    /// Held on the paddle by the catch effect.
    pub caught: bool,
}

impl Ball {
    fn resting(x: f32) -> Self {
        Self {
            x,
            y: BALL_REST_Y,
            dx: 0.0,
            dy: 0.0,
            active: true,
            caught: false,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.x, self.y, BALL_RADIUS * 2.0, BALL_RADIUS * 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    pub fn center(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    fn center_on(&mut self, cx: f32) {
        self.x = clamp_center(cx, self.width / 2.0, FIELD_WIDTH) - self.width / 2.0;
    }
}

/// Discrete inputs accepted by Breakout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BreakoutInput {
    SetPaddleX(f32),
    Launch,
    FireLaser,
}

/// Serializable game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutState {
    pub phase: GamePhase,
    pub level: u32,
    pub score: i64,
    pub lives: u32,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub items: Vec<Item>,
    pub lasers: Vec<Laser>,
    pub ball_speed: f32,
    pub laser_enabled: bool,
    pub catch_enabled: bool,
    pub barrier_active: bool,
    pub penetrate: bool,
}

/// Paddle, ball and bricks with power-up capsules and a boss stage.
pub struct Breakout {
    state: BreakoutState,
    sound: SharedSound,
    rng: StdRng,
    stepper: FixedStep,
    clock: SimClock,
    last_laser_ms: Option<f64>,
    config: BreakoutConfig,
}

/// Lay out the bricks for `level`.
pub fn build_bricks(level: u32, config: &BreakoutConfig, rng: &mut StdRng) -> Vec<Brick> {
    if level == config.boss_level {
        return vec![Brick {
            x: FIELD_WIDTH / 2.0 - 40.0,
            y: 50.0,
            width: 80.0,
            height: 40.0,
            kind: BrickKind::Boss,
            hp: config.boss_hp.max(1),
            active: true,
        }];
    }

    let hard_chance = config.hard_block_chance(level);
    let mut bricks = Vec::with_capacity(BRICK_ROWS * BRICK_COLS);
    for r in 0..BRICK_ROWS {
        for c in 0..BRICK_COLS {
            let hard = hard_chance > 0.0 && rng.random::<f32>() < hard_chance;
            bricks.push(Brick {
                x: c as f32 * BRICK_WIDTH,
                y: r as f32 * BRICK_HEIGHT + BRICK_TOP,
                width: BRICK_WIDTH - BRICK_GAP,
                height: BRICK_HEIGHT - BRICK_GAP,
                kind: if hard { BrickKind::Hard } else { BrickKind::Normal },
                hp: if hard { 2 } else { 1 },
                active: true,
            });
        }
    }
    bricks
}

impl Breakout {
    pub fn new(sound: SharedSound, level: u32) -> Self {
        Self::with_seed(sound, level, rand::random())
    }

    pub fn with_seed(sound: SharedSound, level: u32, seed: u64) -> Self {
        Self::with_config(sound, level, seed, BreakoutConfig::default())
    }

    /// Randomly seeded instance using caller-supplied tunables.
    pub fn configured(sound: SharedSound, level: u32, config: BreakoutConfig) -> Self {
        Self::with_config(sound, level, rand::random(), config)
    }

    pub fn with_config(sound: SharedSound, level: u32, seed: u64, config: BreakoutConfig) -> Self {
        let level = level.max(1);
        let mut rng = StdRng::seed_from_u64(seed);
        let bricks = build_bricks(level, &config, &mut rng);
        let paddle = Paddle {
            x: FIELD_WIDTH / 2.0 - PADDLE_WIDTH / 2.0,
            y: PADDLE_Y,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        };
        let state = BreakoutState {
            phase: GamePhase::Ready,
            level,
            score: 0,
            lives: config.lives.max(1),
            balls: vec![Ball::resting(paddle.center())],
            paddle,
            bricks,
            items: Vec::new(),
            lasers: Vec::new(),
            // max() also maps a NaN speed to the floor.
            ball_speed: config
                .ball_speed(level)
                .max(MIN_BALL_SPEED)
                .min(MAX_BALL_SPEED),
            laser_enabled: false,
            catch_enabled: false,
            barrier_active: false,
            penetrate: false,
        };
        Self {
            state,
            sound,
            rng,
            stepper: FixedStep::new(),
            clock: SimClock::new(),
            last_laser_ms: None,
            config,
        }
    }

    pub fn state(&self) -> &BreakoutState {
        &self.state
    }

    pub fn config(&self) -> &BreakoutConfig {
        &self.config
    }

    pub fn set_paddle_x(&mut self, x: f32) {
        if !matches!(self.state.phase, GamePhase::Ready | GamePhase::Playing) {
            return;
        }
        let old_center = self.state.paddle.center();
        self.state.paddle.center_on(x);
        let center = self.state.paddle.center();
        let shift = center - old_center;

        match self.state.phase {
            GamePhase::Ready => {
                for ball in &mut self.state.balls {
                    ball.x = center;
                }
            },
            _ => {
                for ball in self.state.balls.iter_mut().filter(|b| b.caught) {
                    ball.x += shift;
                }
            },
        }
    }

    /// Serve from `Ready`, or release a ball held by the catch effect.
    pub fn launch(&mut self) {
        match self.state.phase {
            GamePhase::Ready => {
                let speed = self.state.ball_speed;
                let sign = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
                for ball in &mut self.state.balls {
                    ball.dx = speed * sign;
                    ball.dy = -speed;
                }
                self.state.phase = GamePhase::Playing;
            },
            GamePhase::Playing => {
                let center = self.state.paddle.center();
                let speed = self.state.ball_speed;
                let mut released = false;
                for ball in self.state.balls.iter_mut().filter(|b| b.caught) {
                    ball.caught = false;
                    ball.dx = (ball.x - center) * PADDLE_DEFLECT;
                    ball.dy = -speed;
                    released = true;
                }
                if released {
                    self.state.catch_enabled = false;
                    self.sound.play_tone(660.0, Wave::Square, 0.05);
                }
            },
            _ => {},
        }
    }

    pub fn fire_laser(&mut self) {
        if self.state.phase != GamePhase::Playing || !self.state.laser_enabled {
            return;
        }
        let now = self.clock.now_ms();
        if let Some(last) = self.last_laser_ms
            && now - last < f64::from(self.config.laser_cooldown_ms)
        {
            return;
        }
        self.last_laser_ms = Some(now);
        let paddle = &self.state.paddle;
        let y = paddle.y - LASER_HEIGHT;
        for x in [paddle.x + 4.0, paddle.x + paddle.width - 4.0] {
            self.state.lasers.push(Laser { x, y, active: true });
        }
        self.sound.play_tone(1320.0, Wave::Square, 0.03);
    }

    /// One 60 Hz physics frame.
    fn step(&mut self) {
        self.step_balls();
        self.step_lasers();
        self.step_items();

        self.state.balls.retain(|b| b.active);
        self.state.bricks.retain(|b| b.active);
        self.state.items.retain(|i| i.active);
        self.state.lasers.retain(|l| l.active);

        if self.state.bricks.is_empty() {
            self.state.phase = GamePhase::Cleared;
            self.sound.play_clear();
            tracing::debug!(level = self.state.level, score = self.state.score, "Breakout cleared");
            return;
        }

        if self.state.balls.is_empty() {
            self.lose_life();
        }
    }

    fn step_balls(&mut self) {
        let paddle_box = self.state.paddle.bounds();
        let paddle_center = self.state.paddle.center();
        let mut holding = self.state.balls.iter().any(|b| b.active && b.caught);
        let mut destroyed = Vec::new();

        for ball in &mut self.state.balls {
            if !ball.active || ball.caught {
                continue;
            }
            ball.x += ball.dx;
            ball.y += ball.dy;

            if ball.x - BALL_RADIUS < 0.0 {
                ball.x = BALL_RADIUS;
                ball.dx = ball.dx.abs();
                self.sound.play_tone(440.0, Wave::Triangle, 0.05);
            } else if ball.x + BALL_RADIUS > FIELD_WIDTH {
                ball.x = FIELD_WIDTH - BALL_RADIUS;
                ball.dx = -ball.dx.abs();
                self.sound.play_tone(440.0, Wave::Triangle, 0.05);
            }
            if ball.y - BALL_RADIUS < 0.0 {
                ball.y = BALL_RADIUS;
                ball.dy = ball.dy.abs();
                self.sound.play_tone(440.0, Wave::Triangle, 0.05);
            } else if ball.y + BALL_RADIUS > FIELD_HEIGHT {
                if self.state.barrier_active {
                    self.state.barrier_active = false;
                    ball.y = FIELD_HEIGHT - BALL_RADIUS;
                    ball.dy = -ball.dy.abs();
                    self.sound.play_tone(440.0, Wave::Triangle, 0.05);
                } else {
                    ball.active = false;
                    continue;
                }
            }

            if ball.dy > 0.0 && ball.bounds().overlaps(&paddle_box) {
                ball.y = paddle_box.y - BALL_RADIUS;
                if self.state.catch_enabled && !holding {
                    ball.caught = true;
                    ball.dx = 0.0;
                    ball.dy = 0.0;
                    holding = true;
                } else {
                    ball.dy = -ball.dy.abs();
                    ball.dx = (ball.x - paddle_center) * PADDLE_DEFLECT;
                }
                self.sound.play_tone(660.0, Wave::Square, 0.05);
                continue;
            }

            // At most one brick per ball per frame.
            let ball_box = ball.bounds();
            if let Some(brick) = self
                .state
                .bricks
                .iter_mut()
                .find(|b| b.active && b.bounds().overlaps(&ball_box))
            {
                if !self.state.penetrate {
                    ball.dy = -ball.dy;
                }
                if brick.hit() {
                    destroyed.push(brick.clone());
                } else {
                    self.sound.play_tone(220.0, Wave::Square, 0.05);
                }
            }
        }

        for brick in destroyed {
            self.on_brick_destroyed(&brick);
        }
    }

    fn step_lasers(&mut self) {
        let mut destroyed = Vec::new();
        for laser in &mut self.state.lasers {
            if !laser.active {
                continue;
            }
            laser.y -= LASER_SPEED;
            if laser.y + LASER_HEIGHT < 0.0 {
                laser.active = false;
                continue;
            }
            let bolt = laser.bounds();
            if let Some(brick) = self
                .state
                .bricks
                .iter_mut()
                .find(|b| b.active && b.bounds().overlaps(&bolt))
            {
                laser.active = false;
                if brick.hit() {
                    destroyed.push(brick.clone());
                } else {
                    self.sound.play_tone(220.0, Wave::Square, 0.05);
                }
            }
        }
        for brick in destroyed {
            self.on_brick_destroyed(&brick);
        }
    }

    fn step_items(&mut self) {
        let paddle_box = self.state.paddle.bounds();
        let mut collected = Vec::new();
        for item in &mut self.state.items {
            if !item.active {
                continue;
            }
            item.y += ITEM_FALL_SPEED;
            if item.bounds().overlaps(&paddle_box) {
                item.active = false;
                collected.push(item.kind);
            } else if item.y > FIELD_HEIGHT {
                item.active = false;
            }
        }
        for kind in collected {
            self.apply_item(kind);
        }
    }

    fn on_brick_destroyed(&mut self, brick: &Brick) {
        self.state.score += brick.kind.points();
        let pitch = 880.0 + self.rng.random::<f32>() * 200.0;
        self.sound.play_tone(pitch, Wave::Square, 0.1);

        if self.rng.random::<f32>() < self.config.item_drop_chance {
            let kind = ItemKind::ALL[self.rng.random_range(0..ItemKind::ALL.len())];
            let b = brick.bounds();
            self.state
                .items
                .push(Item::dropped_at(b.x + b.w / 2.0, b.y + b.h / 2.0, kind));
        }
    }

    /// Apply a collected capsule. Effects persist for the rest of the instance.
    pub fn apply_item(&mut self, kind: ItemKind) {
        match kind {
            ItemKind::Expand => self.resize_paddle(1.5),
            ItemKind::Shrink => self.resize_paddle(0.7),
            ItemKind::Slow => self.scale_ball_speed(0.7),
            ItemKind::Fast => self.scale_ball_speed(1.3),
            ItemKind::Multi => self.fork_balls(),
            ItemKind::Laser => self.state.laser_enabled = true,
            ItemKind::Catch => self.state.catch_enabled = true,
            ItemKind::Life => self.state.lives += 1,
            ItemKind::Barrier => self.state.barrier_active = true,
            ItemKind::Penetrate => self.state.penetrate = true,
        }
        self.sound.play_power_up();
    }

    fn resize_paddle(&mut self, factor: f32) {
        let center = self.state.paddle.center();
        self.state.paddle.width =
            (self.state.paddle.width * factor).clamp(PADDLE_MIN_WIDTH, PADDLE_MAX_WIDTH);
        self.state.paddle.center_on(center);
    }

    fn scale_ball_speed(&mut self, factor: f32) {
        let old = self.state.ball_speed;
        let new = (old * factor).clamp(MIN_BALL_SPEED, MAX_BALL_SPEED);
        let applied = new / old;
        self.state.ball_speed = new;
        for ball in &mut self.state.balls {
            ball.dx *= applied;
            ball.dy *= applied;
        }
    }

    /// Every ball gains two forks with `dx - 1` and `dx + 1`.
    fn fork_balls(&mut self) {
        let speed = self.state.ball_speed;
        let mut forks = Vec::new();
        for ball in self.state.balls.iter().filter(|b| b.active) {
            for offset in [-1.0, 1.0] {
                if self.state.balls.len() + forks.len() >= MAX_BALLS {
                    break;
                }
                let mut fork = ball.clone();
                fork.caught = false;
                fork.dx = ball.dx + offset;
                if ball.caught {
                    fork.dy = -speed;
                }
                forks.push(fork);
            }
        }
        self.state.balls.extend(forks);
    }

    fn lose_life(&mut self) {
        self.state.lives = self.state.lives.saturating_sub(1);
        self.sound.play_tone(110.0, Wave::Sawtooth, 0.3);
        if self.state.lives == 0 {
            self.state.phase = GamePhase::GameOver;
            tracing::debug!(level = self.state.level, score = self.state.score, "Breakout over");
            return;
        }
        self.state.balls = vec![Ball::resting(self.state.paddle.center())];
        self.state.items.clear();
        self.state.lasers.clear();
        self.stepper.reset();
        self.state.phase = GamePhase::Ready;
    }
}

impl Default for Breakout {
    fn default() -> Self {
        Self::new(arcade_core::sound::silent(), 1)
    }
}

impl ArcadeGame for Breakout {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            id: GameId::Breakout,
            name: "Breakout".to_string(),
            description: "Break every brick with the ball. Catch capsules for power-ups."
                .to_string(),
            advances_on_clear: true,
        }
    }

    fn update(&mut self, delta_ms: f32) {
        if self.state.phase != GamePhase::Playing || !(delta_ms > 0.0) {
            return;
        }
        self.clock.advance(delta_ms);
        let steps = self.stepper.advance(delta_ms);
        for _ in 0..steps {
            if self.state.phase != GamePhase::Playing {
                break;
            }
            self.step();
        }
    }

    fn apply_input(&mut self, input: &[u8]) {
        let Some(input) = decode_input::<BreakoutInput>(GameId::Breakout, input) else {
            return;
        };
        match input {
            BreakoutInput::SetPaddleX(x) => self.set_paddle_x(x),
            BreakoutInput::Launch => self.launch(),
            BreakoutInput::FireLaser => self.fire_laser(),
        }
    }

    fn score(&self) -> i64 {
        self.state.score
    }

    fn carry_over_score(&mut self, score: i64) {
        self.state.score = score;
    }

    arcade_game_boilerplate!(state_type: BreakoutState);
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::test_helpers::{
        RecordingSound, contract_malformed_input_ignored, contract_negative_delta_is_noop,
        contract_ready_update_is_noop, contract_terminal_update_is_noop,
    };
    use arcade_core::timing::FRAME_MS;

    fn quiet_config() -> BreakoutConfig {
        BreakoutConfig {
            item_drop_chance: 0.0,
            ..BreakoutConfig::default()
        }
    }

    fn game(level: u32) -> Breakout {
        Breakout::with_config(arcade_core::sound::silent(), level, 7, quiet_config())
    }

    fn free_ball(x: f32, y: f32, dx: f32, dy: f32) -> Ball {
        Ball {
            x,
            y,
            dx,
            dy,
            active: true,
            caught: false,
        }
    }

    fn input(i: BreakoutInput) -> Vec<u8> {
        rmp_serde::to_vec(&i).unwrap()
    }

    #[test]
    fn level_one_has_full_normal_grid() {
        let g = game(1);
        assert_eq!(g.state.bricks.len(), BRICK_ROWS * BRICK_COLS);
        assert!(g.state.bricks.iter().all(|b| b.kind == BrickKind::Normal && b.hp == 1));
        assert_eq!(g.state.phase, GamePhase::Ready);
        assert_eq!(g.state.lives, 3);
        assert_eq!(g.state.balls.len(), 1);
    }

    #[test]
    fn boss_level_is_single_block() {
        let g = game(10);
        assert_eq!(g.state.bricks.len(), 1);
        assert_eq!(g.state.bricks[0].kind, BrickKind::Boss);
        assert_eq!(g.state.bricks[0].hp, 20);
    }

    #[test]
    fn later_levels_roll_hard_blocks() {
        let g = game(9);
        assert!(g.state.bricks.iter().any(|b| b.kind == BrickKind::Hard && b.hp == 2));
    }

    #[test]
    fn ball_speed_scales_with_level() {
        assert!(game(8).state.ball_speed > game(2).state.ball_speed);
    }

    #[test]
    fn paddle_is_clamped_and_carries_resting_ball() {
        let mut g = game(1);
        g.set_paddle_x(-100.0);
        assert_eq!(g.state.paddle.x, 0.0);
        assert_eq!(g.state.balls[0].x, PADDLE_WIDTH / 2.0);
        g.set_paddle_x(1000.0);
        assert_eq!(g.state.paddle.x, FIELD_WIDTH - PADDLE_WIDTH);
    }

    #[test]
    fn launch_starts_play_upwards() {
        let mut g = game(1);
        g.launch();
        assert_eq!(g.state.phase, GamePhase::Playing);
        let ball = &g.state.balls[0];
        assert!(ball.dy < 0.0);
        assert_eq!(ball.dx.abs(), g.state.ball_speed);
    }

    #[test]
    fn clearing_normal_bricks_scores_ten_each() {
        let mut g = game(1);
        g.launch();
        let n = g.state.bricks.len() as i64;
        while let Some(brick) = g.state.bricks.first().cloned() {
            let b = brick.bounds();
            g.state.balls = vec![free_ball(b.x + b.w / 2.0, b.y + b.h / 2.0, 0.0, -3.0)];
            g.step();
        }
        assert_eq!(g.state.phase, GamePhase::Cleared);
        assert_eq!(g.state.score, 10 * n);
    }

    #[test]
    fn hard_brick_takes_two_hits() {
        let mut g = game(1);
        g.launch();
        g.state.bricks = vec![Brick {
            x: 100.0,
            y: 100.0,
            width: 38.0,
            height: 13.0,
            kind: BrickKind::Hard,
            hp: 2,
            active: true,
        }];
        g.state.balls = vec![free_ball(119.0, 106.0, 0.0, -3.0)];
        g.step();
        assert_eq!(g.state.bricks[0].hp, 1);
        assert_eq!(g.state.score, 0);
        g.state.balls = vec![free_ball(119.0, 106.0, 0.0, -3.0)];
        g.step();
        assert_eq!(g.state.score, 50);
        assert_eq!(g.state.phase, GamePhase::Cleared);
    }

    #[test]
    fn multi_triples_balls_with_unit_forks() {
        let mut g = game(1);
        g.launch();
        g.state.balls = vec![
            free_ball(100.0, 300.0, 2.0, -3.0),
            free_ball(200.0, 300.0, -1.5, -3.0),
        ];
        g.apply_item(ItemKind::Multi);
        assert_eq!(g.state.balls.len(), 6);
        for source in [2.0f32, -1.5] {
            let dxs: Vec<f32> = g
                .state
                .balls
                .iter()
                .filter(|b| (b.dx - source).abs() <= 1.0 + 1e-5)
                .map(|b| b.dx)
                .collect();
            assert!(dxs.contains(&(source - 1.0)));
            assert!(dxs.contains(&(source + 1.0)));
        }
    }

    #[test]
    fn losing_last_ball_costs_a_life() {
        let mut g = game(1);
        g.launch();
        g.state.balls = vec![free_ball(100.0, 478.0, 0.0, 3.0)];
        g.step();
        assert_eq!(g.state.lives, 2);
        assert_eq!(g.state.phase, GamePhase::Ready);
        assert_eq!(g.state.balls.len(), 1);
    }

    #[test]
    fn losing_final_life_is_game_over() {
        let mut g = game(1);
        g.launch();
        g.state.lives = 1;
        g.state.balls = vec![free_ball(100.0, 478.0, 0.0, 3.0)];
        g.step();
        assert_eq!(g.state.phase, GamePhase::GameOver);
        assert_eq!(g.state.lives, 0);
    }

    #[test]
    fn one_of_several_balls_lost_keeps_life() {
        let mut g = game(1);
        g.launch();
        g.state.balls = vec![
            free_ball(100.0, 478.0, 0.0, 3.0),
            free_ball(100.0, 300.0, 0.0, -3.0),
        ];
        g.step();
        assert_eq!(g.state.lives, 3);
        assert_eq!(g.state.balls.len(), 1);
    }

    #[test]
    fn barrier_saves_once() {
        let mut g = game(1);
        g.launch();
        g.apply_item(ItemKind::Barrier);
        g.state.balls = vec![free_ball(100.0, 478.0, 0.0, 3.0)];
        g.step();
        assert!(!g.state.barrier_active);
        assert_eq!(g.state.balls.len(), 1);
        assert!(g.state.balls[0].dy < 0.0);
        assert_eq!(g.state.lives, 3);
    }

    #[test]
    fn catch_holds_one_ball_until_launch() {
        let mut g = game(1);
        g.launch();
        g.apply_item(ItemKind::Catch);
        let cx = g.state.paddle.center();
        g.state.balls = vec![
            free_ball(cx, PADDLE_Y - 2.0, 0.0, 3.0),
            free_ball(cx + 10.0, PADDLE_Y - 2.0, 0.0, 3.0),
        ];
        g.step();
        let held = g.state.balls.iter().filter(|b| b.caught).count();
        assert_eq!(held, 1);

        g.launch();
        assert!(g.state.balls.iter().all(|b| !b.caught));
        assert!(!g.state.catch_enabled);
    }

    #[test]
    fn caught_ball_follows_paddle() {
        let mut g = game(1);
        g.launch();
        g.apply_item(ItemKind::Catch);
        let cx = g.state.paddle.center();
        g.state.balls = vec![free_ball(cx, PADDLE_Y - 2.0, 0.0, 3.0)];
        g.step();
        g.set_paddle_x(cx + 20.0);
        assert_eq!(g.state.balls[0].x, cx + 20.0);
    }

    #[test]
    fn laser_needs_pickup_and_respects_cooldown() {
        let mut g = game(1);
        g.launch();
        g.fire_laser();
        assert!(g.state.lasers.is_empty());

        g.apply_item(ItemKind::Laser);
        g.fire_laser();
        assert_eq!(g.state.lasers.len(), 2);
        g.fire_laser();
        assert_eq!(g.state.lasers.len(), 2);

        g.clock.advance(300.0);
        g.fire_laser();
        assert_eq!(g.state.lasers.len(), 4);
    }

    #[test]
    fn laser_damages_brick() {
        let mut g = game(1);
        g.launch();
        g.state.balls = vec![free_ball(300.0, 300.0, 0.0, -1.0)];
        let target = g.state.bricks[BRICK_COLS * (BRICK_ROWS - 1)].bounds();
        g.state.lasers = vec![Laser {
            x: target.x + 5.0,
            y: target.bottom() + 2.0,
            active: true,
        }];
        let before = g.state.bricks.len();
        g.step();
        assert_eq!(g.state.bricks.len(), before - 1);
        assert!(g.state.lasers.is_empty());
        assert_eq!(g.state.score, 10);
    }

    #[test]
    fn penetrate_does_not_bounce() {
        let mut g = game(1);
        g.launch();
        g.apply_item(ItemKind::Penetrate);
        let b = g.state.bricks[0].bounds();
        g.state.balls = vec![free_ball(b.x + b.w / 2.0, b.y + b.h / 2.0, 0.0, -3.0)];
        g.step();
        assert!(g.state.balls[0].dy < 0.0);
        assert_eq!(g.state.score, 10);
    }

    #[test]
    fn paddle_size_effects_are_bounded() {
        let mut g = game(1);
        for _ in 0..5 {
            g.apply_item(ItemKind::Expand);
        }
        assert_eq!(g.state.paddle.width, PADDLE_MAX_WIDTH);
        for _ in 0..10 {
            g.apply_item(ItemKind::Shrink);
        }
        assert_eq!(g.state.paddle.width, PADDLE_MIN_WIDTH);
    }

    #[test]
    fn slow_and_fast_scale_velocity() {
        let mut g = game(1);
        g.launch();
        let before = g.state.balls[0].dy;
        g.apply_item(ItemKind::Slow);
        assert!((g.state.balls[0].dy - before * 0.7).abs() < 1e-4);
    }

    #[test]
    fn seeded_construction_ignores_config_files() {
        let a = Breakout::with_seed(arcade_core::sound::silent(), 6, 11);
        let b = Breakout::with_config(
            arcade_core::sound::silent(),
            6,
            11,
            BreakoutConfig::default(),
        );
        assert_eq!(a.state, b.state);
        assert_eq!(a.state.lives, 3);
        assert_eq!(a.config(), &BreakoutConfig::default());
    }

    #[test]
    fn configured_uses_given_tunables() {
        let cfg = BreakoutConfig {
            lives: 9,
            ..BreakoutConfig::default()
        };
        let g = Breakout::configured(arcade_core::sound::silent(), 1, cfg);
        assert_eq!(g.state.lives, 9);
    }

    #[test]
    fn zero_base_speed_is_clamped_and_stays_finite() {
        let cfg = BreakoutConfig {
            base_ball_speed: 0.0,
            speed_per_level: 0.0,
            item_drop_chance: 0.0,
            ..BreakoutConfig::default()
        };
        let mut g = Breakout::with_config(arcade_core::sound::silent(), 1, 3, cfg);
        assert_eq!(g.state.ball_speed, MIN_BALL_SPEED);
        g.launch();
        g.apply_item(ItemKind::Slow);
        g.apply_item(ItemKind::Fast);
        assert!(g.state.ball_speed.is_finite());
        assert!(g.state.balls.iter().all(|b| b.dx.is_finite() && b.dy.is_finite()));

        let nan = BreakoutConfig {
            base_ball_speed: f32::NAN,
            ..BreakoutConfig::default()
        };
        let g = Breakout::with_config(arcade_core::sound::silent(), 1, 3, nan);
        assert_eq!(g.state.ball_speed, MIN_BALL_SPEED);
    }

    #[test]
    fn item_pickup_plays_power_up() {
        let (rec, sound) = RecordingSound::shared();
        let mut g = Breakout::with_config(sound, 1, 1, quiet_config());
        g.launch();
        let cx = g.state.paddle.center();
        g.state.balls = vec![free_ball(100.0, 200.0, 0.0, -1.0)];
        g.state.items = vec![Item::dropped_at(cx, PADDLE_Y - 4.0, ItemKind::Life)];
        g.step();
        assert_eq!(g.state.lives, 4);
        assert!(g.state.items.is_empty());
        assert!(rec.played_freq(880.0));
    }

    #[test]
    fn apply_input_dispatches() {
        let mut g = game(1);
        g.apply_input(&input(BreakoutInput::SetPaddleX(40.0)));
        assert_eq!(g.state.paddle.center(), 40.0);
        g.apply_input(&input(BreakoutInput::Launch));
        assert_eq!(g.state.phase, GamePhase::Playing);
    }

    #[test]
    fn update_runs_fixed_steps() {
        let mut g = game(1);
        g.launch();
        let y0 = g.state.balls[0].y;
        g.update(FRAME_MS * 3.0 + 1.0);
        let dy = g.state.balls[0].dy;
        assert!((g.state.balls[0].y - (y0 + dy * 3.0)).abs() < 1e-3);
    }

    #[test]
    fn carry_over_score_seeds_next_level() {
        let mut g = game(2);
        g.carry_over_score(450);
        assert_eq!(g.score(), 450);
        assert!(g.metadata().advances_on_clear);
    }

    #[test]
    fn contract_suite() {
        let mut g = game(1);
        contract_ready_update_is_noop(&mut g);
        contract_malformed_input_ignored(&mut g);
        g.launch();
        g.update(100.0);
        contract_negative_delta_is_noop(&mut g);
        g.state.phase = GamePhase::GameOver;
        contract_terminal_update_is_noop(&mut g);
        g.state.phase = GamePhase::Cleared;
        contract_terminal_update_is_noop(&mut g);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn paddle_always_inside_field(
                xs in proptest::collection::vec(-500.0f32..900.0, 1..40),
                seed in 0u64..1000,
            ) {
                let mut g = Breakout::with_config(
                    arcade_core::sound::silent(), 1, seed, BreakoutConfig::default());
                g.launch();
                for x in xs {
                    g.set_paddle_x(x);
                    g.update(FRAME_MS * 2.0);
                    let p = &g.state.paddle;
                    prop_assert!(p.x >= 0.0);
                    prop_assert!(p.x + p.width <= FIELD_WIDTH + 1e-3);
                }
            }

            #[test]
            fn entity_lists_stay_bounded(seed in 0u64..200) {
                let mut g = Breakout::with_config(
                    arcade_core::sound::silent(), 3, seed, BreakoutConfig::default());
                g.launch();
                for i in 0..3000 {
                    if g.state.phase == GamePhase::Ready {
                        g.launch();
                    }
                    let target = g.state.balls.first().map(|b| b.x).unwrap_or(160.0);
                    g.set_paddle_x(target);
                    if i % 20 == 0 {
                        g.fire_laser();
                    }
                    g.update(FRAME_MS);
                    prop_assert!(g.state.balls.len() <= MAX_BALLS);
                    prop_assert!(g.state.items.len() <= BRICK_ROWS * BRICK_COLS);
                    prop_assert!(g.state.lasers.len() <= 200);
                    prop_assert!(g.state.score >= 0);
                }
            }
        }
    }
}
