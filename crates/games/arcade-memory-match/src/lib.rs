use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_registry::GameId;
use arcade_core::game_trait::{ArcadeGame, GameMetadata, GamePhase, decode_input};
use arcade_core::sound::{SharedSound, Wave};
use arcade_core::timing::Countdown;

/// How long a mismatched pair stays face up.
pub const MISMATCH_LOCK_MS: f32 = 1000.0;
/// Level from which the board grows to 4x4.
pub const LARGE_BOARD_FROM_LEVEL: u32 = 4;
/// Each of the last few seconds of the countdown ticks.
pub const TICK_FROM_SECS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: usize,
    pub value: u8,
    pub flipped: bool,
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryMatchInput {
    FlipCard(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMatchState {
    pub phase: GamePhase,
    pub level: u32,
    pub score: i64,
    pub cards: Vec<Card>,
    pub time_left: u32,
    /// Indices of face-up cards awaiting resolution.
    pub flipped: Vec<usize>,
    /// Remaining lock after a mismatch; the board ignores flips while set.
    pub lock_ms: Option<f32>,
}

/// Pair-finding card game against the clock.
pub struct MemoryMatch {
    state: MemoryMatchState,
    sound: SharedSound,
    countdown: Countdown,
}

pub fn pair_count(level: u32) -> u8 {
    if level >= LARGE_BOARD_FROM_LEVEL { 8 } else { 6 }
}

pub fn time_limit_secs(level: u32) -> u32 {
    65u32.saturating_sub(level.saturating_mul(5)).max(30)
}

fn deal(level: u32, rng: &mut StdRng) -> Vec<Card> {
    let mut values: Vec<u8> = (0..pair_count(level)).flat_map(|v| [v, v]).collect();
    values.shuffle(rng);
    values
        .into_iter()
        .enumerate()
        .map(|(id, value)| Card {
            id,
            value,
            flipped: false,
            matched: false,
        })
        .collect()
}

impl MemoryMatch {
    pub fn new(sound: SharedSound, level: u32) -> Self {
        Self::with_seed(sound, level, rand::random())
    }

    pub fn with_seed(sound: SharedSound, level: u32, seed: u64) -> Self {
        let level = level.max(1);
        let mut rng = StdRng::seed_from_u64(seed);
        let seconds = time_limit_secs(level);
        Self {
            state: MemoryMatchState {
                phase: GamePhase::Ready,
                level,
                score: 0,
                cards: deal(level, &mut rng),
                time_left: seconds,
                flipped: Vec::with_capacity(2),
                lock_ms: None,
            },
            sound,
            countdown: Countdown::new(seconds),
        }
    }

    pub fn state(&self) -> &MemoryMatchState {
        &self.state
    }

    pub fn flip_card(&mut self, index: usize) {
        match self.state.phase {
            GamePhase::Ready => {},
            GamePhase::Playing => {
                if self.state.lock_ms.is_some() {
                    return;
                }
            },
            _ => return,
        }
        let Some(card) = self.state.cards.get_mut(index) else {
            return;
        };
        if card.flipped || card.matched {
            return;
        }
        card.flipped = true;
        self.state.phase = GamePhase::Playing;
        self.sound.play_tone(880.0, Wave::Triangle, 0.05);
        self.state.flipped.push(index);

        if self.state.flipped.len() == 2 {
            self.resolve_pair();
        }
    }

    fn resolve_pair(&mut self) {
        let (a, b) = (self.state.flipped[0], self.state.flipped[1]);
        if self.state.cards[a].value != self.state.cards[b].value {
            self.sound.play_tone(200.0, Wave::Sawtooth, 0.1);
            self.state.lock_ms = Some(MISMATCH_LOCK_MS);
            return;
        }

        self.state.cards[a].matched = true;
        self.state.cards[b].matched = true;
        self.state.flipped.clear();
        self.state.score += 100 + i64::from(self.state.time_left);
        self.sound.play_tone(1200.0, Wave::Square, 0.1);

        if self.state.cards.iter().all(|c| c.matched) {
            self.state.phase = GamePhase::Cleared;
            self.countdown.halt();
            self.sound.play_decide();
            tracing::debug!(level = self.state.level, score = self.state.score, "Board cleared");
        }
    }

    fn turn_back_pair(&mut self) {
        for i in self.state.flipped.drain(..) {
            if let Some(card) = self.state.cards.get_mut(i) {
                card.flipped = false;
            }
        }
        self.state.lock_ms = None;
    }
}

impl Default for MemoryMatch {
    fn default() -> Self {
        Self::new(arcade_core::sound::silent(), 1)
    }
}

impl ArcadeGame for MemoryMatch {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            id: GameId::MemoryMatch,
            name: "Memory Match".to_string(),
            description: "Find every pair before time runs out.".to_string(),
            advances_on_clear: true,
        }
    }

    fn update(&mut self, delta_ms: f32) {
        if self.state.phase != GamePhase::Playing || !(delta_ms > 0.0) {
            return;
        }
        if let Some(remaining) = self.state.lock_ms {
            let remaining = remaining - delta_ms;
            if remaining <= 0.0 {
                self.turn_back_pair();
            } else {
                self.state.lock_ms = Some(remaining);
            }
        }

        let before = self.state.time_left;
        let expired = self.countdown.tick(delta_ms);
        self.state.time_left = self.countdown.seconds_left();
        if !expired && self.state.time_left < before && self.state.time_left <= TICK_FROM_SECS {
            self.sound.play_tick();
        }
        if expired {
            self.countdown.halt();
            self.sound.play_tone(55.0, Wave::Sawtooth, 0.5);
            self.state.phase = GamePhase::GameOver;
            tracing::debug!(level = self.state.level, score = self.state.score, "Out of time");
        }
    }

    fn apply_input(&mut self, input: &[u8]) {
        if let Some(MemoryMatchInput::FlipCard(i)) = decode_input(GameId::MemoryMatch, input) {
            self.flip_card(i);
        }
    }

    fn score(&self) -> i64 {
        self.state.score
    }

    fn carry_over_score(&mut self, score: i64) {
        self.state.score = score;
    }

    fn cleanup(&mut self) {
        self.countdown.halt();
    }

    arcade_game_boilerplate!(state_type: MemoryMatchState);
}
