use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_registry::GameId;
use arcade_core::game_trait::{ArcadeGame, GameMetadata, GamePhase, decode_input};
use arcade_core::sound::{SharedSound, Wave};
use arcade_core::timing::Countdown;

pub const HOLES: usize = 9;
pub const ROUND_SECS: u32 = 30;
pub const RISE_MS: f32 = 150.0;
/// How long a hit or missed hole shows its reaction.
pub const REACTION_MS: f32 = 500.0;
pub const MOLE_POINTS: i64 = 10;
pub const BOMB_PENALTY: i64 = 20;
/// Each of the last few seconds of the countdown ticks.
pub const TICK_FROM_SECS: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoleState {
    #[default]
    Hidden,
    Rising,
    Up,
    Hit,
    Miss,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoleKind {
    #[default]
    Mole,
    Bomb,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub state: HoleState,
    pub kind: MoleKind,
    /// Time left in the current state; unused while hidden.
    pub timer_ms: f32,
}

impl Hole {
    fn show(&mut self, state: HoleState, ms: f32) {
        self.state = state;
        self.timer_ms = ms;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhacAMoleInput {
    Start,
    Hit(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhacAMoleState {
    pub phase: GamePhase,
    pub level: u32,
    /// May go negative through bomb penalties.
    pub score: i64,
    pub holes: Vec<Hole>,
    pub time_left: u32,
    pub spawn_timer_ms: f32,
}

/// Nine-hole whack-a-mole with decoy bombs.
pub struct WhacAMole {
    state: WhacAMoleState,
    sound: SharedSound,
    rng: StdRng,
    countdown: Countdown,
}

pub fn spawn_interval_ms(level: u32) -> f32 {
    (1000.0 - level as f32 * 50.0).max(200.0)
}

pub fn up_time_ms(level: u32) -> f32 {
    (2000.0 - level as f32 * 100.0).max(500.0)
}

/// Chance a spawn is a bomb. Left uncapped: from level 16 every spawn is a
/// bomb, so those stages cannot reach their clear target.
pub fn bomb_chance(level: u32) -> f32 {
    0.2 + level as f32 * 0.05
}

impl WhacAMole {
    pub fn new(sound: SharedSound, level: u32) -> Self {
        Self::with_seed(sound, level, rand::random())
    }

    pub fn with_seed(sound: SharedSound, level: u32, seed: u64) -> Self {
        Self {
            state: WhacAMoleState {
                phase: GamePhase::Ready,
                level: level.max(1),
                score: 0,
                holes: vec![Hole::default(); HOLES],
                time_left: ROUND_SECS,
                spawn_timer_ms: 0.0,
            },
            sound,
            rng: StdRng::seed_from_u64(seed),
            countdown: Countdown::new(ROUND_SECS),
        }
    }

    pub fn state(&self) -> &WhacAMoleState {
        &self.state
    }

    pub fn start(&mut self) {
        if self.state.phase == GamePhase::Ready {
            self.state.phase = GamePhase::Playing;
            self.sound.play_start();
        }
    }

    pub fn hit(&mut self, index: usize) {
        match self.state.phase {
            GamePhase::Ready => self.start(),
            GamePhase::Playing => {},
            _ => return,
        }
        let Some(hole) = self.state.holes.get_mut(index) else {
            return;
        };
        if hole.state != HoleState::Up {
            return;
        }
        match hole.kind {
            MoleKind::Mole => {
                hole.show(HoleState::Hit, REACTION_MS);
                self.state.score += MOLE_POINTS;
                self.sound.play_tone(880.0, Wave::Square, 0.1);
            },
            MoleKind::Bomb => {
                hole.show(HoleState::Miss, REACTION_MS);
                self.state.score -= BOMB_PENALTY;
                self.sound.play_noise(0.5);
            },
        }
    }

    fn spawn(&mut self) {
        let hidden: Vec<usize> = (0..HOLES)
            .filter(|&i| self.state.holes[i].state == HoleState::Hidden)
            .collect();
        if hidden.is_empty() {
            return;
        }
        let i = hidden[self.rng.random_range(0..hidden.len())];
        let kind = if self.rng.random::<f32>() < bomb_chance(self.state.level) {
            MoleKind::Bomb
        } else {
            MoleKind::Mole
        };
        let hole = &mut self.state.holes[i];
        hole.kind = kind;
        hole.show(HoleState::Rising, RISE_MS);
    }

    fn advance_holes(&mut self, delta_ms: f32) {
        let up_time = up_time_ms(self.state.level);
        for hole in &mut self.state.holes {
            if hole.state == HoleState::Hidden {
                continue;
            }
            hole.timer_ms -= delta_ms;
            if hole.timer_ms > 0.0 {
                continue;
            }
            match hole.state {
                HoleState::Rising => hole.show(HoleState::Up, up_time),
                _ => hole.show(HoleState::Hidden, 0.0),
            }
        }
    }

    fn end_round(&mut self) {
        self.countdown.halt();
        if self.state.score >= 100 * i64::from(self.state.level) {
            self.state.phase = GamePhase::Cleared;
            self.sound.play_decide();
        } else {
            self.state.phase = GamePhase::GameOver;
            self.sound.play_tone(55.0, Wave::Sawtooth, 0.5);
        }
        tracing::debug!(
            level = self.state.level,
            score = self.state.score,
            phase = self.state.phase.as_str(),
            "Round over"
        );
    }
}

impl Default for WhacAMole {
    fn default() -> Self {
        Self::new(arcade_core::sound::silent(), 1)
    }
}

impl ArcadeGame for WhacAMole {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            id: GameId::WhacAMole,
            name: "Whac-A-Mole".to_string(),
            description: "Bop the moles, leave the bombs alone.".to_string(),
            advances_on_clear: true,
        }
    }

    fn update(&mut self, delta_ms: f32) {
        if self.state.phase != GamePhase::Playing || !(delta_ms > 0.0) {
            return;
        }

        self.state.spawn_timer_ms -= delta_ms;
        if self.state.spawn_timer_ms <= 0.0 {
            self.spawn();
            self.state.spawn_timer_ms = spawn_interval_ms(self.state.level);
        }
        self.advance_holes(delta_ms);

        let before = self.state.time_left;
        let expired = self.countdown.tick(delta_ms);
        self.state.time_left = self.countdown.seconds_left();
        if !expired && self.state.time_left < before && self.state.time_left <= TICK_FROM_SECS {
            self.sound.play_tick();
        }
        if expired {
            self.end_round();
        }
    }

    fn apply_input(&mut self, input: &[u8]) {
        match decode_input(GameId::WhacAMole, input) {
            Some(WhacAMoleInput::Start) => self.start(),
            Some(WhacAMoleInput::Hit(i)) => self.hit(i),
            None => {},
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

    arcade_game_boilerplate!(state_type: WhacAMoleState);
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::sound::SoundCall;
    use arcade_core::test_helpers::{
        RecordingSound, contract_malformed_input_ignored, contract_negative_delta_is_noop,
        contract_ready_update_is_noop, contract_terminal_update_is_noop,
    };

    fn game(level: u32) -> WhacAMole {
        WhacAMole::with_seed(arcade_core::sound::silent(), level, 21)
    }

    fn with_up(kind: MoleKind) -> WhacAMole {
        let mut g = game(1);
        g.start();
        g.state.holes[4] = Hole {
            state: HoleState::Up,
            kind,
            timer_ms: 1000.0,
        };
        g
    }

    #[test]
    fn difficulty_curves() {
        assert_eq!(spawn_interval_ms(1), 950.0);
        assert_eq!(spawn_interval_ms(20), 200.0);
        assert_eq!(up_time_ms(1), 1900.0);
        assert_eq!(up_time_ms(30), 500.0);
        assert!((bomb_chance(2) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn hitting_mole_scores_ten() {
        let (rec, sound) = RecordingSound::shared();
        let mut g = WhacAMole::with_seed(sound, 1, 1);
        g.start();
        g.state.holes[4] = Hole {
            state: HoleState::Up,
            kind: MoleKind::Mole,
            timer_ms: 1000.0,
        };
        g.hit(4);
        assert_eq!(g.state.score, 10);
        assert_eq!(g.state.holes[4].state, HoleState::Hit);
        assert_eq!(g.state.holes[4].timer_ms, REACTION_MS);
        assert!(rec.played_freq(880.0));
    }

    #[test]
    fn hitting_bomb_costs_twenty_and_may_go_negative() {
        let mut g = with_up(MoleKind::Bomb);
        g.hit(4);
        assert_eq!(g.state.score, -20);
        assert_eq!(g.state.holes[4].state, HoleState::Miss);
    }

    #[test]
    fn only_up_holes_can_be_hit() {
        let mut g = with_up(MoleKind::Mole);
        g.state.holes[4].state = HoleState::Rising;
        g.hit(4);
        g.hit(0);
        g.hit(HOLES + 3);
        assert_eq!(g.state.score, 0);

        g.state.holes[4].state = HoleState::Up;
        g.hit(4);
        g.hit(4);
        assert_eq!(g.state.score, 10);
    }

    #[test]
    fn first_hit_starts_play() {
        let mut g = game(1);
        g.hit(0);
        assert_eq!(g.state.phase, GamePhase::Playing);
    }

    #[test]
    fn spawned_hole_rises_then_hides() {
        let mut g = game(1);
        g.start();
        g.update(10.0);
        let i = g
            .state
            .holes
            .iter()
            .position(|h| h.state == HoleState::Rising)
            .unwrap();
        g.state.spawn_timer_ms = 1.0e9;
        g.update(RISE_MS);
        assert_eq!(g.state.holes[i].state, HoleState::Up);
        assert_eq!(g.state.holes[i].timer_ms, up_time_ms(1));
        g.update(up_time_ms(1));
        assert_eq!(g.state.holes[i].state, HoleState::Hidden);
    }

    #[test]
    fn reaction_resets_to_hidden() {
        let mut g = with_up(MoleKind::Mole);
        g.state.spawn_timer_ms = 1.0e9;
        g.hit(4);
        g.update(REACTION_MS - 1.0);
        assert_eq!(g.state.holes[4].state, HoleState::Hit);
        g.update(1.0);
        assert_eq!(g.state.holes[4].state, HoleState::Hidden);
    }

    #[test]
    fn spawn_never_exceeds_hole_count() {
        let mut g = game(15);
        g.start();
        for _ in 0..200 {
            g.spawn();
        }
        assert!(g.state.holes.iter().all(|h| h.state == HoleState::Rising));
        assert_eq!(g.state.holes.len(), HOLES);
    }

    #[test]
    fn round_end_clears_on_target() {
        let mut g = game(1);
        g.start();
        g.state.score = 100;
        for _ in 0..ROUND_SECS {
            g.update(1000.0);
        }
        assert_eq!(g.state.time_left, 0);
        assert_eq!(g.state.phase, GamePhase::Cleared);
    }

    #[test]
    fn round_end_below_target_is_game_over() {
        let mut g = game(2);
        g.start();
        g.state.score = 150;
        for _ in 0..ROUND_SECS {
            g.update(1000.0);
        }
        assert_eq!(g.state.phase, GamePhase::GameOver);
    }

    #[test]
    fn final_seconds_tick() {
        let (rec, sound) = RecordingSound::shared();
        let mut g = WhacAMole::with_seed(sound, 1, 21);
        g.start();
        let limit = g.state.time_left;
        for _ in 0..(limit - TICK_FROM_SECS - 1) {
            g.update(1000.0);
        }
        assert!(!rec.played_freq(440.0));
        for _ in 0..=TICK_FROM_SECS {
            g.update(1000.0);
        }
        let ticks = rec
            .calls()
            .iter()
            .filter(|c| matches!(c, SoundCall::Tone { wave: Wave::Sine, .. }))
            .count();
        assert_eq!(ticks, TICK_FROM_SECS as usize);
        assert_eq!(g.state.phase, GamePhase::GameOver);
    }

    #[test]
    fn bomb_chance_saturates_from_level_sixteen() {
        assert!(bomb_chance(15) < 1.0);
        assert!(bomb_chance(16) >= 1.0);
        let mut g = game(16);
        g.start();
        for _ in 0..HOLES {
            g.spawn();
        }
        assert!(g.state.holes.iter().all(|h| h.kind == MoleKind::Bomb));
    }

    #[test]
    fn cleanup_stops_countdown() {
        let mut g = game(1);
        g.start();
        g.update(2000.0);
        assert_eq!(g.state.time_left, 28);
        g.cleanup();
        for _ in 0..100 {
            g.update(1000.0);
        }
        assert_eq!(g.state.time_left, 28);
        assert_eq!(g.state.phase, GamePhase::Playing);
    }

    #[test]
    fn contract_suite() {
        let mut g = game(1);
        contract_ready_update_is_noop(&mut g);
        contract_malformed_input_ignored(&mut g);
        g.start();
        g.update(300.0);
        contract_negative_delta_is_noop(&mut g);
        for _ in 0..ROUND_SECS {
            g.update(1000.0);
        }
        contract_terminal_update_is_noop(&mut g);
    }
}
