use std::collections::HashMap;
use std::sync::Arc;

use arcade_core::game_registry::GameId;
use arcade_core::game_trait::ArcadeGame;
use arcade_core::sound::SharedSound;

use crate::config::HostConfig;

/// Builds a fresh logic instance for a level.
pub type GameFactory = Arc<dyn Fn(SharedSound, u32) -> Box<dyn ArcadeGame> + Send + Sync>;

/// Maps game ids to factories for every game compiled into the host.
pub struct GameRegistry {
    factories: HashMap<GameId, GameFactory>,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register_defaults();
        registry
    }

    /// Default registry with per-game tunables read from the paths in
    /// `config`. Files are read here, once, never by a factory.
    pub fn from_config(config: &HostConfig) -> Self {
        let mut registry = Self::new();
        #[cfg(feature = "breakout")]
        {
            let tunables =
                arcade_breakout::config::BreakoutConfig::load_from(&config.games.breakout_config);
            registry.register(GameId::Breakout, move |sound, level| {
                Box::new(arcade_breakout::Breakout::configured(sound, level, tunables.clone()))
            });
        }
        #[cfg(not(feature = "breakout"))]
        let _ = config;
        registry
    }

    /// A registry with nothing in it.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    fn register_defaults(&mut self) {
        #[cfg(feature = "breakout")]
        self.register(GameId::Breakout, |sound, level| {
            Box::new(arcade_breakout::Breakout::new(sound, level))
        });
        #[cfg(feature = "snake")]
        self.register(GameId::Snake, |sound, level| {
            Box::new(arcade_snake::Snake::new(sound, level))
        });
        #[cfg(feature = "space-defender")]
        self.register(GameId::SpaceDefender, |sound, level| {
            Box::new(arcade_space_defender::SpaceDefender::new(sound, level))
        });
        #[cfg(feature = "sky-navigator")]
        self.register(GameId::SkyNavigator, |sound, level| {
            Box::new(arcade_sky_navigator::SkyNavigator::new(sound, level))
        });
        #[cfg(feature = "lane-race")]
        self.register(GameId::LaneRace, |sound, level| {
            Box::new(arcade_lane_race::LaneRace::new(sound, level))
        });
        #[cfg(feature = "endless-jumper")]
        self.register(GameId::EndlessJumper, |sound, level| {
            Box::new(arcade_endless_jumper::EndlessJumper::new(sound, level))
        });
        #[cfg(feature = "catch-drop")]
        self.register(GameId::CatchDrop, |sound, level| {
            Box::new(arcade_catch_drop::CatchDrop::new(sound, level))
        });
        #[cfg(feature = "memory-match")]
        self.register(GameId::MemoryMatch, |sound, level| {
            Box::new(arcade_memory_match::MemoryMatch::new(sound, level))
        });
        #[cfg(feature = "whac-a-mole")]
        self.register(GameId::WhacAMole, |sound, level| {
            Box::new(arcade_whac_a_mole::WhacAMole::new(sound, level))
        });
        #[cfg(feature = "mash")]
        self.register(GameId::Mash, |sound, level| {
            Box::new(arcade_mash::Mash::new(sound, level))
        });
        #[cfg(feature = "quick-reflex")]
        self.register(GameId::QuickReflex, |sound, level| {
            Box::new(arcade_quick_reflex::QuickReflex::new(sound, level))
        });
    }

    /// Add or replace the factory for `id`.
    pub fn register<F>(&mut self, id: GameId, factory: F)
    where
        F: Fn(SharedSound, u32) -> Box<dyn ArcadeGame> + Send + Sync + 'static,
    {
        self.factories.insert(id, Arc::new(factory));
    }

    pub fn factory(&self, id: GameId) -> Option<GameFactory> {
        self.factories.get(&id).map(Arc::clone)
    }

    pub fn create(&self, id: GameId, sound: SharedSound, level: u32) -> Option<Box<dyn ArcadeGame>> {
        self.factories.get(&id).map(|f| f(sound, level))
    }

    /// Registered ids in menu order.
    pub fn ids(&self) -> Vec<GameId> {
        GameId::ALL
            .into_iter()
            .filter(|id| self.factories.contains_key(id))
            .collect()
    }

    pub fn available_games(&self) -> usize {
        self.factories.len()
    }
}
