use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use arcade_core::game_registry::GameId;
use arcade_core::progress::{DEFAULT_RANKING_SIZE, GameProgress, ProgressSink};
use arcade_core::sound::{SharedSound, SoundSink, Wave};

use crate::error::HostError;

/// Allowed values for the play-time limit, in minutes. Zero means unlimited.
pub const PLAY_TIME_LIMITS: [u32; 4] = [0, 15, 30, 60];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    En,
    #[default]
    Ja,
    JaKana,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub language: Language,
    pub sound_enabled: bool,
    pub bgm_enabled: bool,
    pub play_time_limit_min: u32,
    pub parental_code: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            sound_enabled: true,
            bgm_enabled: true,
            play_time_limit_min: 0,
            parental_code: "9999".to_string(),
        }
    }
}

/// Everything persisted to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreData {
    pub settings: Settings,
    pub progress: BTreeMap<GameId, GameProgress>,
}

/// JSON-backed settings and per-game progress.
pub struct ArcadeStore {
    path: Option<PathBuf>,
    data: StoreData,
    ranking_size: usize,
    sound_on: Arc<AtomicBool>,
}

impl ArcadeStore {
    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::from_data(None, StoreData::default())
    }

    fn from_data(path: Option<PathBuf>, data: StoreData) -> Self {
        let sound_on = Arc::new(AtomicBool::new(data.settings.sound_enabled));
        Self {
            path,
            data,
            ranking_size: DEFAULT_RANKING_SIZE,
            sound_on,
        }
    }

    /// Load from `path`, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let mut data = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<StoreData>(&content) {
                Ok(data) => {
                    tracing::info!(path = %path.display(), "Loaded store");
                    data
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    StoreData::default()
                },
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No store file found, starting fresh");
                StoreData::default()
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                StoreData::default()
            },
        };
        let limit = data.settings.play_time_limit_min;
        if !PLAY_TIME_LIMITS.contains(&limit) {
            tracing::warn!(limit, "Stored play time limit is not allowed, using unlimited");
            data.settings.play_time_limit_min = 0;
        }
        Self::from_data(Some(path.to_path_buf()), data)
    }

    pub fn with_ranking_size(mut self, size: usize) -> Self {
        self.ranking_size = size.max(1);
        self
    }

    /// Write the store to its path. In-memory stores do nothing.
    pub fn save(&self) -> Result<(), HostError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "Saved store");
        Ok(())
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }

    pub fn settings(&self) -> &Settings {
        &self.data.settings
    }

    pub fn set_language(&mut self, language: Language) {
        self.data.settings.language = language;
    }

    /// Flip the sound setting and return the new value.
    pub fn toggle_sound(&mut self) -> bool {
        let on = !self.data.settings.sound_enabled;
        self.data.settings.sound_enabled = on;
        self.sound_on.store(on, Ordering::Relaxed);
        on
    }

    pub fn toggle_bgm(&mut self) -> bool {
        self.data.settings.bgm_enabled = !self.data.settings.bgm_enabled;
        self.data.settings.bgm_enabled
    }

    pub fn set_play_time_limit(&mut self, minutes: u32) -> Result<(), HostError> {
        if !PLAY_TIME_LIMITS.contains(&minutes) {
            return Err(HostError::Invalid(format!(
                "play time limit must be one of {PLAY_TIME_LIMITS:?}, got {minutes}"
            )));
        }
        self.data.settings.play_time_limit_min = minutes;
        Ok(())
    }

    pub fn verify_parental_code(&self, code: &str) -> bool {
        code.trim() == self.data.settings.parental_code
    }

    /// Forget all progress. Settings are kept.
    pub fn reset_all_data(&mut self) {
        self.data.progress.clear();
        tracing::info!("Progress data reset");
    }

    pub fn progress(&self, game: GameId) -> Option<&GameProgress> {
        self.data.progress.get(&game)
    }

    /// Wrap `inner` so it goes quiet whenever sound is disabled here.
    pub fn sound_gate(&self, inner: SharedSound) -> SharedSound {
        Arc::new(SoundGate {
            inner,
            enabled: Arc::clone(&self.sound_on),
        })
    }
}

impl ProgressSink for ArcadeStore {
    fn record(&mut self, game: GameId, stage: u32, score: i64, name: Option<&str>) {
        let limit = self.ranking_size;
        let entry = self.data.progress.entry(game).or_default();
        entry.submit(stage, score, name, limit);
        tracing::debug!(game = %game, stage, score, unlocked = entry.unlocked_stages, "Recorded run");
    }
}

/// Drops every call while the shared flag is off.
pub struct SoundGate {
    inner: SharedSound,
    enabled: Arc<AtomicBool>,
}

impl SoundGate {
    fn is_on(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

impl SoundSink for SoundGate {
    fn play_tone_at(&self, freq: f32, wave: Wave, duration_secs: f32, delay_secs: f32) {
        if self.is_on() {
            self.inner.play_tone_at(freq, wave, duration_secs, delay_secs);
        }
    }

    fn play_noise(&self, duration_secs: f32) {
        if self.is_on() {
            self.inner.play_noise(duration_secs);
        }
    }
}
