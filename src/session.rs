//! Application-session collaborators shared between screens: localized strings,
//! the active board channel and navigation.

use crate::domain::Board;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::broadcast;
use tracing::debug;

/// Localized display strings keyed by string id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Strings(HashMap<String, String>);

impl Strings {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self(entries)
    }

    /// Text for a key, or the key itself when no translation is loaded
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.0.get(key).map(String::as_str).unwrap_or(key)
    }
}

impl<K, V> FromIterator<(K, V)> for Strings
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A board published on the hub, tagged with the publisher that sent it
#[derive(Debug, Clone, PartialEq)]
pub struct BoardUpdate {
    pub origin: u64,
    pub board: Board,
}

/// Publishes the board selected on any screen so every observer stays in sync
#[derive(Debug, Clone)]
pub struct ActiveBoardHub {
    sender: broadcast::Sender<BoardUpdate>,
    origins: Arc<AtomicU64>,
}

impl ActiveBoardHub {
    const CAPACITY: usize = 16;

    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(Self::CAPACITY);
        Self {
            sender,
            origins: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Hands out a publisher id, unique across clones of this hub
    pub fn register(&self) -> u64 {
        self.origins.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Publishes a board; returns how many observers received it
    pub fn publish(&self, origin: u64, board: Board) -> usize {
        let board_id = board.id;
        match self.sender.send(BoardUpdate { origin, board }) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!(board_id, origin, "Active board published with no observers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardUpdate> {
        self.sender.subscribe()
    }
}

impl Default for ActiveBoardHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Requests route changes from the application shell
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}
