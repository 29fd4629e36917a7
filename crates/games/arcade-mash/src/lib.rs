use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_registry::GameId;
use arcade_core::game_trait::{ArcadeGame, GameMetadata, GamePhase, decode_input};
use arcade_core::sound::{SharedSound, Wave};

pub const ROUND_SECS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MashInput {
    Start,
    Mash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MashState {
    pub phase: GamePhase,
    pub level: u32,
    pub count: u32,
    /// Fractional seconds remaining, never below zero.
    pub time_left: f32,
}

/// Press as fast as possible for ten seconds.
pub struct Mash {
    state: MashState,
    sound: SharedSound,
}

impl Mash {
    pub fn new(sound: SharedSound, level: u32) -> Self {
        Self {
            state: MashState {
                phase: GamePhase::Ready,
                level: level.max(1),
                count: 0,
                time_left: ROUND_SECS,
            },
            sound,
        }
    }

    pub fn state(&self) -> &MashState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state.phase = GamePhase::Ready;
        self.state.count = 0;
        self.state.time_left = ROUND_SECS;
    }

    pub fn start(&mut self) {
        if self.state.phase == GamePhase::Ready {
            self.state.phase = GamePhase::Playing;
            self.sound.play_tone(880.0, Wave::Square, 0.1);
        }
    }

    pub fn mash(&mut self) {
        if self.state.phase != GamePhase::Playing {
            return;
        }
        self.state.count += 1;
        let pitch = 440.0 + (self.state.count % 20) as f32 * 20.0;
        self.sound.play_tone(pitch, Wave::Square, 0.05);
    }
}

impl Default for Mash {
    fn default() -> Self {
        Self::new(arcade_core::sound::silent(), 1)
    }
}

impl ArcadeGame for Mash {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            id: GameId::Mash,
            name: "Mash".to_string(),
            description: "Hit the button as many times as you can in ten seconds.".to_string(),
            advances_on_clear: false,
        }
    }

    fn update(&mut self, delta_ms: f32) {
        if self.state.phase != GamePhase::Playing || !(delta_ms > 0.0) {
            return;
        }
        self.state.time_left -= delta_ms / 1000.0;
        if self.state.time_left <= 0.0 {
            self.state.time_left = 0.0;
            self.state.phase = GamePhase::GameOver;
            self.sound.play_decide();
            tracing::debug!(count = self.state.count, "Time up");
        }
    }

    fn apply_input(&mut self, input: &[u8]) {
        match decode_input(GameId::Mash, input) {
            Some(MashInput::Start) => self.start(),
            Some(MashInput::Mash) => self.mash(),
            None => {},
        }
    }

    fn score(&self) -> i64 {
        i64::from(self.state.count)
    }

    arcade_game_boilerplate!(state_type: MashState);
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::test_helpers::{
        RecordingSound, contract_malformed_input_ignored, contract_negative_delta_is_noop,
        contract_ready_update_is_noop, contract_terminal_update_is_noop, run_until_terminal,
        run_updates,
    };

    #[test]
    fn presses_before_start_do_not_count() {
        let mut g = Mash::default();
        g.mash();
        assert_eq!(g.state.count, 0);
        g.start();
        g.mash();
        g.mash();
        assert_eq!(g.score(), 2);
    }

    #[test]
    fn pitch_rises_and_wraps() {
        let (rec, sound) = RecordingSound::shared();
        let mut g = Mash::new(sound, 1);
        g.start();
        assert!(rec.played_freq(880.0));
        rec.clear();
        g.mash();
        assert!(rec.played_freq(460.0));
        for _ in 0..19 {
            g.mash();
        }
        // count 20 wraps back to the base pitch
        assert!(rec.played_freq(440.0));
    }

    #[test]
    fn countdown_is_fractional() {
        let mut g = Mash::default();
        g.start();
        g.update(250.0);
        assert!((g.state.time_left - 9.75).abs() < 1e-4);
    }

    #[test]
    fn time_up_ends_game_and_freezes_count() {
        let mut g = Mash::default();
        g.start();
        g.mash();
        g.update(10_500.0);
        assert_eq!(g.state.time_left, 0.0);
        assert_eq!(g.state.phase, GamePhase::GameOver);
        g.mash();
        assert_eq!(g.score(), 1);
    }

    #[test]
    fn sixty_hz_frames_end_round_after_ten_seconds() {
        let mut g = Mash::default();
        g.start();
        run_updates(&mut g, 599, 1000.0 / 60.0);
        assert_eq!(g.state.phase, GamePhase::Playing);
        assert!(run_until_terminal(&mut g, 5, 1000.0 / 60.0));
        assert_eq!(g.state.phase, GamePhase::GameOver);
    }

    #[test]
    fn reset_returns_to_ready() {
        let mut g = Mash::default();
        g.start();
        g.mash();
        g.update(10_000.0);
        g.reset();
        assert_eq!(g.state.phase, GamePhase::Ready);
        assert_eq!(g.state.count, 0);
        assert_eq!(g.state.time_left, ROUND_SECS);
    }

    #[test]
    fn contract_suite() {
        let mut g = Mash::default();
        contract_ready_update_is_noop(&mut g);
        contract_malformed_input_ignored(&mut g);
        g.start();
        g.update(100.0);
        contract_negative_delta_is_noop(&mut g);
        g.update(20_000.0);
        contract_terminal_update_is_noop(&mut g);
    }
}
