use serde::{Deserialize, Serialize};

use crate::game_registry::GameId;

/// Number of ranking slots kept per game.
pub const DEFAULT_RANKING_SIZE: usize = 5;

/// Maximum stored length of a ranking name, in characters.
pub const MAX_NAME_LEN: usize = 10;

/// Receives finished runs from a host.
pub trait ProgressSink {
    fn record(&mut self, game: GameId, stage: u32, score: i64, name: Option<&str>);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Unlock state and leaderboard for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameProgress {
    pub unlocked_stages: u32,
    pub rankings: Vec<RankingEntry>,
}

impl Default for GameProgress {
    fn default() -> Self {
        Self {
            unlocked_stages: 1,
            rankings: Vec::new(),
        }
    }
}

impl GameProgress {
    /// Fold a finished run into the record.
    pub fn submit(&mut self, stage: u32, score: i64, name: Option<&str>, limit: usize) {
        self.unlocked_stages = self.unlocked_stages.max(stage.saturating_add(1));
        self.rankings.push(RankingEntry {
            score,
            name: name.and_then(normalize_name),
        });
        // Stable sort keeps earlier entries ahead on ties.
        self.rankings.sort_by(|a, b| b.score.cmp(&a.score));
        self.rankings.truncate(limit);
    }

    /// Whether `score` would enter the top `limit`.
    pub fn qualifies(&self, score: i64, limit: usize) -> bool {
        if limit == 0 {
            return false;
        }
        self.rankings.len() < limit || self.rankings.iter().any(|r| score > r.score)
    }

    pub fn best(&self) -> Option<i64> {
        self.rankings.first().map(|r| r.score)
    }
}

/// Trim, cut to `MAX_NAME_LEN` characters and upper-case. Blank names are dropped.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cut: String = trimmed.chars().take(MAX_NAME_LEN).collect();
    Some(cut.to_uppercase())
}
