use serde::Deserialize;

use crate::error::HostError;

const CONFIG_FILE: &str = "arcade.toml";

/// Top-level host configuration, loaded from `arcade.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub session: SessionSection,
    pub store: StoreSection,
    pub games: GamesSection,
}

/// Frame loop and level transition timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub tick_rate_hz: f32,
    /// Largest delta handed to a game in one frame.
    pub frame_cap_ms: f32,
    /// Pause between a clear and the next level's instance.
    pub advance_delay_ms: f32,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            frame_cap_ms: 50.0,
            advance_delay_ms: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub path: String,
    pub ranking_size: usize,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: "arcade-store.json".to_string(),
            ranking_size: arcade_core::progress::DEFAULT_RANKING_SIZE,
        }
    }
}

/// Per-game tunable files, read once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GamesSection {
    pub breakout_config: String,
}

impl Default for GamesSection {
    fn default() -> Self {
        Self {
            breakout_config: "config/breakout.toml".to_string(),
        }
    }
}

impl HostConfig {
    /// Check ranges, logging each problem. Returns the first one as an error.
    pub fn validate(&self) -> Result<(), HostError> {
        let mut problems = Vec::new();
        if !(self.session.tick_rate_hz > 0.0) {
            problems.push("session.tick_rate_hz must be > 0");
        }
        if !(self.session.frame_cap_ms > 0.0) {
            problems.push("session.frame_cap_ms must be > 0");
        }
        if !(self.session.advance_delay_ms >= 0.0) {
            problems.push("session.advance_delay_ms must be >= 0");
        }
        if self.store.path.trim().is_empty() {
            problems.push("store.path must not be empty");
        }
        if self.store.ranking_size == 0 {
            problems.push("store.ranking_size must be > 0");
        }
        for p in &problems {
            tracing::error!("{p}");
        }
        match problems.first() {
            Some(p) => Err(HostError::Invalid((*p).to_string())),
            None => Ok(()),
        }
    }

    /// Load config from `arcade.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => match toml::from_str::<HostConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from {CONFIG_FILE}");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {CONFIG_FILE}: {e}, using defaults");
                    HostConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {CONFIG_FILE} found, using defaults");
                HostConfig::default()
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("ARCADE_STORE_PATH")
            && !path.is_empty()
        {
            self.store.path = path;
        }
        if let Some(path) = var("ARCADE_BREAKOUT_CONFIG")
            && !path.is_empty()
        {
            self.games.breakout_config = path;
        }
        if let Some(val) = var("ARCADE_TICK_RATE")
            && let Ok(hz) = val.parse::<f32>()
        {
            self.session.tick_rate_hz = hz;
        }
        if let Some(val) = var("ARCADE_FRAME_CAP_MS")
            && let Ok(ms) = val.parse::<f32>()
        {
            self.session.frame_cap_ms = ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = HostConfig::default();
        assert_eq!(cfg.session.tick_rate_hz, 60.0);
        assert_eq!(cfg.session.frame_cap_ms, 50.0);
        assert_eq!(cfg.session.advance_delay_ms, 2000.0);
        assert_eq!(cfg.store.path, "arcade-store.json");
        assert_eq!(cfg.store.ranking_size, 5);
        assert_eq!(cfg.games.breakout_config, "config/breakout.toml");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[session]
frame_cap_ms = 33.0

[store]
path = "/tmp/scores.json"

[games]
breakout_config = "tunables/breakout.toml"
"#;
        let cfg: HostConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.session.frame_cap_ms, 33.0);
        assert_eq!(cfg.session.tick_rate_hz, 60.0);
        assert_eq!(cfg.store.path, "/tmp/scores.json");
        assert_eq!(cfg.store.ranking_size, 5);
        assert_eq!(cfg.games.breakout_config, "tunables/breakout.toml");
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg: HostConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.session.advance_delay_ms, 2000.0);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = HostConfig::default();
        cfg.session.tick_rate_hz = 0.0;
        assert!(matches!(cfg.validate(), Err(HostError::Invalid(_))));

        let mut cfg = HostConfig::default();
        cfg.store.ranking_size = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = HostConfig::default();
        cfg.session.frame_cap_ms = f32::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = HostConfig::default();
        cfg.apply_env(|key| match key {
            "ARCADE_STORE_PATH" => Some("other.json".to_string()),
            "ARCADE_TICK_RATE" => Some("30".to_string()),
            "ARCADE_FRAME_CAP_MS" => Some("not a number".to_string()),
            "ARCADE_BREAKOUT_CONFIG" => Some("/etc/arcade/breakout.toml".to_string()),
            _ => None,
        });
        assert_eq!(cfg.games.breakout_config, "/etc/arcade/breakout.toml");
        assert_eq!(cfg.store.path, "other.json");
        assert_eq!(cfg.session.tick_rate_hz, 30.0);
        assert_eq!(cfg.session.frame_cap_ms, 50.0);
    }

    #[test]
    fn empty_store_path_override_is_ignored() {
        let mut cfg = HostConfig::default();
        cfg.apply_env(|key| (key == "ARCADE_STORE_PATH").then(String::new));
        assert_eq!(cfg.store.path, "arcade-store.json");
    }
}
