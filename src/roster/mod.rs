//! Player Attribute Store and roster lookups.
//!
//! The store is a read-only id lookup. Unknown ids come back as `None` and
//! callers skip that slot. `ensure_playable` turns whatever a user registered
//! into a full XI, using a fixed fallback roster when needed.

pub mod catalogue;
pub mod csv_loader;
pub mod store;

use crate::domain::{Player, PlayerId, PlayingXi, UserId, XI_SIZE};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub use catalogue::{builtin_players, FALLBACK_AWAY_XI, FALLBACK_HOME_XI};
pub use csv_loader::load_players_csv;
pub use store::{InMemoryPlayerStore, StatOverride};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("roster backend error: {0}")]
    Backend(String),
    #[error("csv parse error: {0}")]
    Csv(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no playable XI: only {0} known players after fallback")]
    NoPlayableXi(usize),
}

/// Read-only lookup of player attributes by id.
pub trait PlayerStore: Send + Sync {
    fn by_id(&self, id: &PlayerId) -> Option<Player>;

    /// Display name, falling back to the raw id.
    fn name_of(&self, id: &PlayerId) -> String {
        self.by_id(id)
            .map(|p| p.name)
            .unwrap_or_else(|| id.to_string())
    }
}

/// Per-user squad data owned outside the match engine.
#[async_trait]
pub trait RosterService: Send + Sync {
    /// The user's registered XI, possibly incomplete. `None` if never set.
    async fn playing_xi(&self, user: &UserId) -> Result<Option<Vec<PlayerId>>, RosterError>;

    async fn team_name(&self, user: &UserId) -> Result<Option<String>, RosterError>;
}

/// Fixed rosters held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticRosters {
    xis: HashMap<UserId, Vec<PlayerId>>,
    names: HashMap<UserId, String>,
}

impl StaticRosters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_xi(mut self, user: UserId, xi: Vec<PlayerId>) -> Self {
        self.xis.insert(user, xi);
        self
    }

    pub fn with_team_name(mut self, user: UserId, name: impl Into<String>) -> Self {
        self.names.insert(user, name.into());
        self
    }
}

#[async_trait]
impl RosterService for StaticRosters {
    async fn playing_xi(&self, user: &UserId) -> Result<Option<Vec<PlayerId>>, RosterError> {
        Ok(self.xis.get(user).cloned())
    }

    async fn team_name(&self, user: &UserId) -> Result<Option<String>, RosterError> {
        Ok(self.names.get(user).cloned())
    }
}

/// Build a playable XI from a registered squad.
///
/// Unknown and duplicate ids are dropped. If fewer than eleven remain, the
/// fallback roster is used instead.
pub fn ensure_playable(
    store: &dyn PlayerStore,
    registered: Option<&[PlayerId]>,
    fallback: &[&str],
) -> Result<PlayingXi, RosterError> {
    let known = |ids: &mut dyn Iterator<Item = PlayerId>| -> Vec<PlayerId> {
        let mut seen = HashSet::new();
        ids.filter(|id| store.by_id(id).is_some())
            .filter(|id| seen.insert(id.clone()))
            .take(XI_SIZE)
            .collect()
    };

    if let Some(ids) = registered {
        let picked = known(&mut ids.iter().cloned());
        if picked.len() == XI_SIZE {
            if let Ok(xi) = PlayingXi::new(picked) {
                return Ok(xi);
            }
        } else {
            tracing::warn!(
                known = picked.len(),
                registered = ids.len(),
                "registered XI incomplete, using fallback roster"
            );
        }
    }

    let picked = known(&mut fallback.iter().map(|id| PlayerId::new(*id)));
    let count = picked.len();
    PlayingXi::new(picked).map_err(|_| RosterError::NoPlayableXi(count))
}
