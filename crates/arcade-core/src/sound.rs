use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Oscillator shape for a synthesized tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wave {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Fire-and-forget audio capability injected into every game.
///
/// Implementations must never block or fail visibly. Only the two
/// primitives are required; the presets are built from them so that a
/// recording sink sees exactly what a real backend would be asked to play.
pub trait SoundSink: Send + Sync {
    fn play_tone_at(&self, freq: f32, wave: Wave, duration_secs: f32, delay_secs: f32);

    fn play_noise(&self, duration_secs: f32);

    fn play_tone(&self, freq: f32, wave: Wave, duration_secs: f32) {
        self.play_tone_at(freq, wave, duration_secs, 0.0);
    }

    fn play_select(&self) {
        self.play_tone(880.0, Wave::Square, 0.1);
    }

    fn play_decide(&self) {
        self.play_tone(1760.0, Wave::Square, 0.1);
    }

    fn play_cancel(&self) {
        self.play_tone(220.0, Wave::Triangle, 0.2);
    }

    fn play_hit(&self) {
        self.play_noise(0.1);
    }

    /// Countdown blip for the final seconds of a timed round.
    fn play_tick(&self) {
        self.play_tone(440.0, Wave::Sine, 0.05);
    }

    /// C5 E5 G5 C6 arpeggio.
    fn play_start(&self) {
        arpeggio(
            self,
            Wave::Square,
            &[(523.0, 0.0, 0.1), (659.0, 0.1, 0.1), (784.0, 0.2, 0.15), (1047.0, 0.3, 0.2)],
        );
    }

    fn play_clear(&self) {
        arpeggio(
            self,
            Wave::Square,
            &[(784.0, 0.0, 0.1), (988.0, 0.1, 0.1), (1175.0, 0.2, 0.15), (1568.0, 0.3, 0.25)],
        );
    }

    fn play_power_up(&self) {
        arpeggio(
            self,
            Wave::Sawtooth,
            &[(440.0, 0.0, 0.08), (554.0, 0.05, 0.08), (659.0, 0.1, 0.08), (880.0, 0.15, 0.12)],
        );
    }

    fn play_gunshot(&self) {
        self.play_noise(0.15);
        self.play_tone(80.0, Wave::Sawtooth, 0.1);
    }
}

// (freq, delay, duration) triples
fn arpeggio<S: SoundSink + ?Sized>(sink: &S, wave: Wave, notes: &[(f32, f32, f32)]) {
    for &(freq, delay, duration) in notes {
        sink.play_tone_at(freq, wave, duration, delay);
    }
}

/// Shared handle every game holds.
pub type SharedSound = Arc<dyn SoundSink>;

/// Sink that discards everything. Used by headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSound;

impl SoundSink for SilentSound {
    fn play_tone_at(&self, _freq: f32, _wave: Wave, _duration_secs: f32, _delay_secs: f32) {}

    fn play_noise(&self, _duration_secs: f32) {}
}

pub fn silent() -> SharedSound {
    Arc::new(SilentSound)
}

/// One request made to a sink, as seen by a recorder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundCall {
    Tone {
        freq: f32,
        wave: Wave,
        duration: f32,
        delay: f32,
    },
    Noise {
        duration: f32,
    },
}

impl SoundCall {
    pub fn freq(&self) -> Option<f32> {
        match self {
            SoundCall::Tone { freq, .. } => Some(*freq),
            SoundCall::Noise { .. } => None,
        }
    }

    pub fn is_noise(&self) -> bool {
        matches!(self, SoundCall::Noise { .. })
    }
}
