use std::path::Path;

use serde::{Deserialize, Serialize};

/// Tunables for Breakout, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutConfig {
    /// Lives at the start of a level instance.
    pub lives: u32,
    /// Ball speed at level 0 (px per frame).
    pub base_ball_speed: f32,
    /// Added to ball speed per level.
    pub speed_per_level: f32,
    /// Chance a destroyed brick drops an item.
    pub item_drop_chance: f32,
    /// Level that replaces the grid with a single boss block.
    pub boss_level: u32,
    pub boss_hp: u32,
    /// First level that can roll hard blocks.
    pub hard_block_from_level: u32,
    pub hard_block_base_chance: f32,
    pub hard_block_chance_step: f32,
    pub hard_block_max_chance: f32,
    pub laser_cooldown_ms: f32,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            lives: 3,
            base_ball_speed: 3.0,
            speed_per_level: 0.2,
            item_drop_chance: 0.2,
            boss_level: 10,
            boss_hp: 20,
            hard_block_from_level: 5,
            hard_block_base_chance: 0.2,
            hard_block_chance_step: 0.05,
            hard_block_max_chance: 0.5,
            laser_cooldown_ms: 300.0,
        }
    }
}

impl BreakoutConfig {
    /// Read tunables from `path`, falling back to defaults when the file is
    /// missing or malformed. Game constructors never call this.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "Loaded Breakout config");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                },
            },
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Self>(content)
    }

    pub fn ball_speed(&self, level: u32) -> f32 {
        self.base_ball_speed + level as f32 * self.speed_per_level
    }

    /// Probability that a grid cell becomes a hard block at `level`.
    pub fn hard_block_chance(&self, level: u32) -> f32 {
        if level < self.hard_block_from_level {
            return 0.0;
        }
        let steps = (level - self.hard_block_from_level) as f32;
        (self.hard_block_base_chance + steps * self.hard_block_chance_step)
            .min(self.hard_block_max_chance)
    }
}
