//! In-memory player catalogue with an admin override map.

use super::{catalogue, PlayerStore};
use crate::domain::{Player, PlayerId, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Admin-set replacement values for a catalogue entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatOverride {
    pub batting: Option<u8>,
    pub bowling: Option<u8>,
    pub role: Option<Role>,
}

impl StatOverride {
    fn apply(&self, mut player: Player) -> Player {
        if let Some(batting) = self.batting {
            player.batting = batting.min(100);
        }
        if let Some(bowling) = self.bowling {
            player.bowling = bowling.min(100);
        }
        if let Some(role) = self.role {
            player.role = role;
        }
        player
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPlayerStore {
    players: HashMap<PlayerId, Player>,
    overrides: RwLock<HashMap<PlayerId, StatOverride>>,
}

impl InMemoryPlayerStore {
    pub fn new(players: Vec<Player>) -> Self {
        Self {
            players: players.into_iter().map(|p| (p.id.clone(), p)).collect(),
            overrides: RwLock::new(HashMap::new()),
        }
    }

    /// Store seeded with the built-in catalogue (covers both fallback XIs).
    pub fn builtin() -> Self {
        Self::new(catalogue::builtin_players())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn set_override(&self, id: PlayerId, stat: StatOverride) {
        let mut overrides = self.overrides.write().unwrap_or_else(|e| e.into_inner());
        overrides.insert(id, stat);
    }

    pub fn clear_override(&self, id: &PlayerId) -> bool {
        let mut overrides = self.overrides.write().unwrap_or_else(|e| e.into_inner());
        overrides.remove(id).is_some()
    }
}

impl PlayerStore for InMemoryPlayerStore {
    fn by_id(&self, id: &PlayerId) -> Option<Player> {
        let player = self.players.get(id)?.clone();
        let overrides = self.overrides.read().unwrap_or_else(|e| e.into_inner());
        Some(match overrides.get(id) {
            Some(stat) => stat.apply(player),
            None => player,
        })
    }
}
