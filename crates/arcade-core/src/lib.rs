pub mod game_registry;
pub mod game_trait;
pub mod geometry;
pub mod progress;
pub mod sound;
pub mod timing;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::{Arc, Mutex};

    use crate::game_trait::{ArcadeGame, GamePhase};
    use crate::sound::{SharedSound, SoundCall, SoundSink, Wave};

    /// Sound sink that keeps every call for later inspection.
    #[derive(Debug, Default)]
    pub struct RecordingSound {
        calls: Mutex<Vec<SoundCall>>,
    }

    impl RecordingSound {
        pub fn new() -> Self {
            Self::default()
        }

        /// A recorder plus the same recorder as a game-ready handle.
        pub fn shared() -> (Arc<RecordingSound>, SharedSound) {
            let rec = Arc::new(RecordingSound::new());
            let shared: SharedSound = Arc::clone(&rec) as SharedSound;
            (rec, shared)
        }

        pub fn calls(&self) -> Vec<SoundCall> {
            self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }

        pub fn clear(&self) {
            self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
        }

        /// True if any tone at `freq` (within 0.5 Hz) was requested.
        pub fn played_freq(&self, freq: f32) -> bool {
            self.calls()
                .iter()
                .filter_map(SoundCall::freq)
                .any(|f| (f - freq).abs() < 0.5)
        }

        pub fn noise_count(&self) -> usize {
            self.calls().iter().filter(|c| c.is_noise()).count()
        }

        fn push(&self, call: SoundCall) {
            self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
        }
    }

    impl SoundSink for RecordingSound {
        fn play_tone_at(&self, freq: f32, wave: Wave, duration_secs: f32, delay_secs: f32) {
            self.push(SoundCall::Tone {
                freq,
                wave,
                duration: duration_secs,
                delay: delay_secs,
            });
        }

        fn play_noise(&self, duration_secs: f32) {
            self.push(SoundCall::Noise {
                duration: duration_secs,
            });
        }
    }

    /// Run `n` updates of `delta_ms` each.
    pub fn run_updates(game: &mut dyn ArcadeGame, n: usize, delta_ms: f32) {
        for _ in 0..n {
            game.update(delta_ms);
        }
    }

    /// Update until the phase is terminal or `max_updates` is exhausted.
    pub fn run_until_terminal(game: &mut dyn ArcadeGame, max_updates: usize, delta_ms: f32) -> bool {
        for _ in 0..max_updates {
            if game.phase().is_terminal() {
                return true;
            }
            game.update(delta_ms);
        }
        game.phase().is_terminal()
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Every ArcadeGame implementation must pass these. Game crates call
    // them from their own #[cfg(test)] modules with a concrete instance
    // prepared in the required phase.

    /// A negative delta must leave the serialized state untouched.
    pub fn contract_negative_delta_is_noop(game: &mut dyn ArcadeGame) {
        let before = game.serialize_state();
        game.update(-16.0);
        game.update(-1000.0);
        let after = game.serialize_state();
        assert_eq!(before, after, "update(negative) must not change state");
    }

    /// Once terminal, further updates must change nothing.
    pub fn contract_terminal_update_is_noop(game: &mut dyn ArcadeGame) {
        assert!(
            game.phase().is_terminal(),
            "game must be terminal before this contract, got {:?}",
            game.phase()
        );
        let before = game.serialize_state();
        let score = game.score();
        for _ in 0..120 {
            game.update(16.0);
        }
        game.update(5000.0);
        assert_eq!(before, game.serialize_state(), "terminal state must be idempotent");
        assert_eq!(score, game.score());
    }

    /// Before the first meaningful input, updates must not advance play.
    pub fn contract_ready_update_is_noop(game: &mut dyn ArcadeGame) {
        assert_eq!(game.phase(), GamePhase::Ready);
        let before = game.serialize_state();
        for _ in 0..60 {
            game.update(16.0);
        }
        assert_eq!(before, game.serialize_state(), "update in Ready must not change state");
        assert_eq!(game.phase(), GamePhase::Ready);
    }

    /// Garbage input bytes must be dropped without touching state.
    pub fn contract_malformed_input_ignored(game: &mut dyn ArcadeGame) {
        let before = game.serialize_state();
        for junk in [&[][..], &[0xc1][..], &[0xff, 0x00, 0x13, 0x37][..], &b"not msgpack"[..]] {
            game.apply_input(junk);
        }
        assert_eq!(before, game.serialize_state(), "malformed input must be ignored");
    }

    /// `serialize_state()` must always produce bytes.
    pub fn contract_state_is_nonempty(game: &dyn ArcadeGame) {
        assert!(
            !game.serialize_state().is_empty(),
            "serialize_state() must return non-empty bytes"
        );
    }
}
