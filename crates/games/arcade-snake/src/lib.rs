use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_registry::GameId;
use arcade_core::game_trait::{ArcadeGame, GameMetadata, GamePhase, decode_input};
use arcade_core::sound::{SharedSound, Wave};

pub const COLS: i32 = 16;
pub const ROWS: i32 = 24;
/// Cells kept free of obstacles in front of the starting head.
const SAFE_AHEAD: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn step(self, dir: Direction) -> Cell {
        let (dx, dy) = dir.delta();
        Cell::new(self.x + dx, self.y + dy)
    }

    fn in_bounds(self) -> bool {
        (0..COLS).contains(&self.x) && (0..ROWS).contains(&self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnakeInput {
    SetDirection(Direction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnakeState {
    pub phase: GamePhase,
    pub level: u32,
    pub score: i64,
    /// Head first.
    pub snake: VecDeque<Cell>,
    pub food: Cell,
    pub walls: Vec<Cell>,
    pub direction: Direction,
    pub next_direction: Direction,
    /// Milliseconds between grid moves.
    pub tick_ms: f32,
}

/// Grid snake with buffered turns and level obstacles.
pub struct Snake {
    state: SnakeState,
    sound: SharedSound,
    rng: StdRng,
    since_tick_ms: f32,
}

/// Move interval for `level`: 10 ms faster per level, floor 50 ms, then
/// a further 30 ms from level 8.
pub fn tick_interval_ms(level: u32) -> f32 {
    let base = 200i64.saturating_sub(i64::from(level) * 10).max(50);
    let turbo = if level >= 8 { 30 } else { 0 };
    (base - turbo) as f32
}

/// Obstacle count for `level`.
pub fn wall_count(level: u32) -> usize {
    if level >= 4 { (level as usize - 3) * 3 } else { 0 }
}

fn start_body() -> VecDeque<Cell> {
    VecDeque::from([Cell::new(5, 10), Cell::new(4, 10), Cell::new(3, 10)])
}

impl Snake {
    pub fn new(sound: SharedSound, level: u32) -> Self {
        Self::with_seed(sound, level, rand::random())
    }

    pub fn with_seed(sound: SharedSound, level: u32, seed: u64) -> Self {
        let level = level.max(1);
        let mut game = Self {
            state: SnakeState {
                phase: GamePhase::Ready,
                level,
                score: 0,
                snake: start_body(),
                food: Cell::new(0, 0),
                walls: Vec::new(),
                direction: Direction::Right,
                next_direction: Direction::Right,
                tick_ms: tick_interval_ms(level),
            },
            sound,
            rng: StdRng::seed_from_u64(seed),
            since_tick_ms: 0.0,
        };
        game.reset();
        game
    }

    pub fn state(&self) -> &SnakeState {
        &self.state
    }

    /// Back to the starting body in `Ready`, with fresh walls and food.
    pub fn reset(&mut self) {
        self.state.phase = GamePhase::Ready;
        self.state.score = 0;
        self.state.snake = start_body();
        self.state.direction = Direction::Right;
        self.state.next_direction = Direction::Right;
        self.state.tick_ms = tick_interval_ms(self.state.level);
        self.since_tick_ms = 0.0;
        self.place_walls();
        self.spawn_food();
    }

    /// Buffer a turn. Reversing the committed direction is rejected.
    pub fn set_direction(&mut self, dir: Direction) {
        if !matches!(self.state.phase, GamePhase::Ready | GamePhase::Playing) {
            return;
        }
        if dir == self.state.direction.opposite() {
            return;
        }
        self.state.next_direction = dir;
        if self.state.phase == GamePhase::Ready {
            self.state.phase = GamePhase::Playing;
        }
    }

    fn free_cells(&self) -> Vec<Cell> {
        let mut free = Vec::with_capacity((COLS * ROWS) as usize);
        for y in 0..ROWS {
            for x in 0..COLS {
                let c = Cell::new(x, y);
                if !self.state.snake.contains(&c) && !self.state.walls.contains(&c) {
                    free.push(c);
                }
            }
        }
        free
    }

    fn place_walls(&mut self) {
        self.state.walls.clear();
        let count = wall_count(self.state.level);
        if count == 0 {
            return;
        }
        let head = self.state.snake[0];
        let mut lane = head;
        let mut ahead = Vec::with_capacity(SAFE_AHEAD as usize);
        for _ in 0..SAFE_AHEAD {
            lane = lane.step(self.state.direction);
            ahead.push(lane);
        }
        let mut candidates: Vec<Cell> = self
            .free_cells()
            .into_iter()
            .filter(|c| !ahead.contains(c))
            .collect();
        candidates.shuffle(&mut self.rng);
        candidates.truncate(count);
        self.state.walls = candidates;
    }

    fn spawn_food(&mut self) {
        let free = self.free_cells();
        if free.is_empty() {
            // Board is full: nothing left to eat.
            self.state.phase = GamePhase::Cleared;
            return;
        }
        self.state.food = free[self.rng.random_range(0..free.len())];
    }

    /// One grid move.
    fn tick(&mut self) {
        self.state.direction = self.state.next_direction;
        let head = self.state.snake[0].step(self.state.direction);

        if !head.in_bounds() || self.state.snake.contains(&head) || self.state.walls.contains(&head) {
            self.die();
            return;
        }

        self.state.snake.push_front(head);
        if head == self.state.food {
            self.state.score += 10;
            self.sound.play_tone(1200.0, Wave::Square, 0.1);
            if self.state.score >= 100 * i64::from(self.state.level) {
                self.state.phase = GamePhase::Cleared;
                self.sound.play_decide();
                tracing::debug!(level = self.state.level, score = self.state.score, "Snake cleared");
                return;
            }
            self.spawn_food();
        } else {
            self.state.snake.pop_back();
        }
    }

    fn die(&mut self) {
        self.sound.play_tone(100.0, Wave::Sawtooth, 0.5);
        self.state.phase = GamePhase::GameOver;
        tracing::debug!(level = self.state.level, score = self.state.score, "Snake crashed");
    }
}

impl Default for Snake {
    fn default() -> Self {
        Self::new(arcade_core::sound::silent(), 1)
    }
}

impl ArcadeGame for Snake {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            id: GameId::Snake,
            name: "Snake".to_string(),
            description: "Eat, grow, and never bite yourself.".to_string(),
            advances_on_clear: true,
        }
    }

    fn update(&mut self, delta_ms: f32) {
        if self.state.phase != GamePhase::Playing || !(delta_ms > 0.0) || !delta_ms.is_finite() {
            return;
        }
        self.since_tick_ms += delta_ms;
        while self.since_tick_ms >= self.state.tick_ms {
            self.since_tick_ms -= self.state.tick_ms;
            self.tick();
            if self.state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    fn apply_input(&mut self, input: &[u8]) {
        if let Some(SnakeInput::SetDirection(dir)) = decode_input(GameId::Snake, input) {
            self.set_direction(dir);
        }
    }

    fn score(&self) -> i64 {
        self.state.score
    }

    fn carry_over_score(&mut self, score: i64) {
        self.state.score = score;
    }

    arcade_game_boilerplate!(state_type: SnakeState);
}
