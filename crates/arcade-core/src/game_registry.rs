use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier for each game in the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameId {
    Breakout,
    Snake,
    SpaceDefender,
    SkyNavigator,
    LaneRace,
    EndlessJumper,
    CatchDrop,
    MemoryMatch,
    WhacAMole,
    Mash,
    QuickReflex,
}

impl GameId {
    pub const ALL: [GameId; 11] = [
        GameId::Breakout,
        GameId::Snake,
        GameId::SpaceDefender,
        GameId::SkyNavigator,
        GameId::LaneRace,
        GameId::EndlessJumper,
        GameId::CatchDrop,
        GameId::MemoryMatch,
        GameId::WhacAMole,
        GameId::Mash,
        GameId::QuickReflex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GameId::Breakout => "breakout",
            GameId::Snake => "snake",
            GameId::SpaceDefender => "space_defender",
            GameId::SkyNavigator => "sky_navigator",
            GameId::LaneRace => "lane_race",
            GameId::EndlessJumper => "endless_jumper",
            GameId::CatchDrop => "catch_drop",
            GameId::MemoryMatch => "memory_match",
            GameId::WhacAMole => "whac_a_mole",
            GameId::Mash => "mash",
            GameId::QuickReflex => "quick_reflex",
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGameId(pub String);

impl fmt::Display for UnknownGameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown game id: {}", self.0)
    }
}

impl std::error::Error for UnknownGameId {}

impl FromStr for GameId {
    type Err = UnknownGameId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept dashes too so CLI users can type `space-defender`.
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        GameId::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| UnknownGameId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_ids_roundtrip_through_str() {
        for id in GameId::ALL {
            assert_eq!(id.as_str().parse::<GameId>(), Ok(id));
            assert_eq!(id.to_string(), id.as_str());
        }
    }

    #[test]
    fn parse_accepts_dashes_and_case() {
        assert_eq!("Space-Defender".parse::<GameId>(), Ok(GameId::SpaceDefender));
        assert_eq!(" whac-a-mole ".parse::<GameId>(), Ok(GameId::WhacAMole));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("pong".parse::<GameId>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&GameId::QuickReflex).unwrap();
        assert_eq!(json, "\"quick_reflex\"");
    }
}
