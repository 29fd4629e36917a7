use arcade_core::game_registry::GameId;
use arcade_core::game_trait::{ArcadeGame, GamePhase};
use arcade_core::progress::ProgressSink;
use arcade_core::sound::SharedSound;

use crate::config::SessionSection;
use crate::error::HostError;
use crate::registry::{GameFactory, GameRegistry};

/// Frame timing the driver applies on top of the game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverConfig {
    pub frame_cap_ms: f32,
    pub advance_delay_ms: f32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::from(&SessionSection::default())
    }
}

impl From<&SessionSection> for DriverConfig {
    fn from(s: &SessionSection) -> Self {
        Self {
            frame_cap_ms: s.frame_cap_ms,
            advance_delay_ms: s.advance_delay_ms,
        }
    }
}

/// Something a frame changed that the caller may want to announce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverEvent {
    /// The instance reached a terminal phase.
    Ended { phase: GamePhase, level: u32, score: i64 },
    /// A cleared instance was replaced by the next level.
    Advanced { level: u32, score: i64 },
}

/// Owns one logic instance and feeds it capped frame deltas.
pub struct Driver {
    id: GameId,
    factory: GameFactory,
    sound: SharedSound,
    game: Box<dyn ArcadeGame>,
    config: DriverConfig,
    last_frame_ms: Option<f64>,
    paused: bool,
    reported: bool,
    advance_in_ms: Option<f32>,
    played_ms: f64,
}

impl Driver {
    pub fn new(
        registry: &GameRegistry,
        id: GameId,
        level: u32,
        sound: SharedSound,
        config: DriverConfig,
    ) -> Result<Self, HostError> {
        let factory = registry
            .factory(id)
            .ok_or_else(|| HostError::UnknownGame(id.to_string()))?;
        let level = level.max(1);
        let game = factory(std::sync::Arc::clone(&sound), level);
        tracing::info!(game = %id, level, "Game instance created");
        Ok(Self {
            id,
            factory,
            sound,
            game,
            config,
            last_frame_ms: None,
            paused: false,
            reported: false,
            advance_in_ms: None,
            played_ms: 0.0,
        })
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn game(&self) -> &dyn ArcadeGame {
        &*self.game
    }

    pub fn phase(&self) -> GamePhase {
        self.game.phase()
    }

    pub fn score(&self) -> i64 {
        self.game.score()
    }

    pub fn level(&self) -> u32 {
        self.game.level()
    }

    pub fn serialize_state(&self) -> Vec<u8> {
        self.game.serialize_state()
    }

    pub fn apply_input(&mut self, input: &[u8]) {
        self.game.apply_input(input);
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether a clear is waiting to turn into the next level.
    pub fn advance_pending(&self) -> bool {
        self.advance_in_ms.is_some()
    }

    /// Total simulation time fed to games, excluding paused frames.
    pub fn played_ms(&self) -> f64 {
        self.played_ms
    }

    /// Whether `limit_min` minutes have been played. Zero never expires.
    pub fn time_limit_reached(&self, limit_min: u32) -> bool {
        limit_min > 0 && self.played_ms >= f64::from(limit_min) * 60_000.0
    }

    /// Advance by the time elapsed since the previous frame.
    pub fn frame(&mut self, now_ms: f64, progress: &mut dyn ProgressSink) -> Option<DriverEvent> {
        let delta = match self.last_frame_ms.replace(now_ms) {
            Some(prev) => ((now_ms - prev).max(0.0) as f32).min(self.config.frame_cap_ms),
            None => 0.0,
        };
        if self.paused {
            return None;
        }
        self.played_ms += f64::from(delta);

        if let Some(remaining) = self.advance_in_ms {
            let remaining = remaining - delta;
            if remaining > 0.0 {
                self.advance_in_ms = Some(remaining);
                return None;
            }
            return Some(self.advance(progress));
        }

        self.game.update(delta);
        let phase = self.game.phase();
        if self.reported || !phase.is_terminal() {
            return None;
        }
        self.reported = true;

        let (level, score) = (self.game.level(), self.game.score());
        if phase == GamePhase::Cleared && self.game.metadata().advances_on_clear {
            // Recorded against the next stage once the advance happens.
            self.advance_in_ms = Some(self.config.advance_delay_ms);
        } else {
            progress.record(self.id, level, score, None);
        }
        tracing::info!(game = %self.id, level, score, phase = phase.as_str(), "Game ended");
        Some(DriverEvent::Ended { phase, level, score })
    }

    fn advance(&mut self, progress: &mut dyn ProgressSink) -> DriverEvent {
        let next = self.game.level().saturating_add(1);
        let score = self.game.score();
        progress.record(self.id, next, score, None);
        self.replace(next);
        self.game.carry_over_score(score);
        tracing::info!(game = %self.id, level = next, score, "Advanced to next level");
        DriverEvent::Advanced { level: next, score }
    }

    /// Start the current level again with a fresh instance.
    pub fn restart(&mut self) {
        let level = self.game.level();
        self.replace(level);
        tracing::info!(game = %self.id, level, "Game restarted");
    }

    fn replace(&mut self, level: u32) {
        self.game.cleanup();
        self.game = (self.factory)(std::sync::Arc::clone(&self.sound), level);
        self.reported = false;
        self.advance_in_ms = None;
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.game.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorded(Vec<(GameId, u32, i64)>);

    impl ProgressSink for Recorded {
        fn record(&mut self, game: GameId, stage: u32, score: i64, _name: Option<&str>) {
            self.0.push((game, stage, score));
        }
    }

    fn driver(id: GameId) -> Driver {
        Driver::new(
            &GameRegistry::new(),
            id,
            1,
            arcade_core::sound::silent(),
            DriverConfig::default(),
        )
        .unwrap()
    }

    fn mash_input(start: bool) -> Vec<u8> {
        let input = if start {
            arcade_mash::MashInput::Start
        } else {
            arcade_mash::MashInput::Mash
        };
        rmp_serde::to_vec(&input).unwrap()
    }

    #[test]
    fn unknown_game_is_an_error() {
        let err = Driver::new(
            &GameRegistry::empty(),
            GameId::Mash,
            1,
            arcade_core::sound::silent(),
            DriverConfig::default(),
        );
        assert!(matches!(err, Err(HostError::UnknownGame(_))));
    }

    #[test]
    fn deltas_are_capped() {
        let mut d = driver(GameId::Mash);
        let mut sink = Recorded::default();
        d.apply_input(&mash_input(true));
        d.frame(1000.0, &mut sink);
        assert_eq!(d.played_ms(), 0.0);
        d.frame(11_000.0, &mut sink);
        assert_eq!(d.played_ms(), 50.0);
        d.frame(11_016.0, &mut sink);
        assert_eq!(d.played_ms(), 66.0);
    }

    #[test]
    fn paused_frames_do_not_advance() {
        let mut d = driver(GameId::Mash);
        let mut sink = Recorded::default();
        d.apply_input(&mash_input(true));
        d.frame(0.0, &mut sink);
        d.pause();
        for i in 1..100 {
            d.frame(f64::from(i) * 16.0, &mut sink);
        }
        assert_eq!(d.played_ms(), 0.0);
        d.resume();
        d.frame(99.0 * 16.0 + 16.0, &mut sink);
        assert_eq!(d.played_ms(), 16.0);
    }

    #[test]
    fn game_over_is_recorded_once() {
        let mut d = driver(GameId::Mash);
        let mut sink = Recorded::default();
        d.apply_input(&mash_input(true));
        for _ in 0..3 {
            d.apply_input(&mash_input(false));
        }
        let mut ended = 0;
        for i in 0..400 {
            if let Some(DriverEvent::Ended { phase, score, .. }) = d.frame(f64::from(i) * 50.0, &mut sink) {
                assert_eq!(phase, GamePhase::GameOver);
                assert_eq!(score, 3);
                ended += 1;
            }
        }
        assert_eq!(ended, 1);
        assert_eq!(sink.0, vec![(GameId::Mash, 1, 3)]);
    }

    #[test]
    fn restart_builds_fresh_instance() {
        let mut d = driver(GameId::Mash);
        let mut sink = Recorded::default();
        d.apply_input(&mash_input(true));
        d.apply_input(&mash_input(false));
        d.frame(0.0, &mut sink);
        d.restart();
        assert_eq!(d.phase(), GamePhase::Ready);
        assert_eq!(d.score(), 0);
    }

    #[test]
    fn time_limit_counts_played_minutes() {
        let mut d = driver(GameId::Mash);
        let mut sink = Recorded::default();
        assert!(!d.time_limit_reached(0));
        for i in 0..=(15 * 60 * 20) {
            d.frame(f64::from(i) * 50.0, &mut sink);
        }
        assert!(d.time_limit_reached(15));
        assert!(!d.time_limit_reached(30));
        assert!(!d.time_limit_reached(0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn played_time_respects_cap(stamps in proptest::collection::vec(-1.0e6f64..1.0e6, 1..80)) {
                let mut d = driver(GameId::Mash);
                let mut sink = Recorded::default();
                d.apply_input(&mash_input(true));
                let mut prev = 0.0;
                for (i, now) in stamps.iter().enumerate() {
                    d.frame(*now, &mut sink);
                    prop_assert!(d.played_ms() >= prev);
                    prop_assert!(d.played_ms() <= i as f64 * 50.0 + 1e-6);
                    prev = d.played_ms();
                }
            }
        }
    }
}
