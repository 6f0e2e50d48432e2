//! Per-browser game state.
//!
//! Each browser gets an opaque token cookie that maps to a [`GameSession`].
//! Only the level engine mutates a `GameSession`, and it does so while
//! holding that session's lock, so actions from one browser never interleave.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use ulid::Ulid;

use crate::models::Difficulty;
use crate::names::LEVEL_COUNT;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelSlot {
    pub player: Option<String>,
    /// Picker contents in the order they were chosen. Reveals may add duplicates.
    pub selection: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameSession {
    difficulty: Option<Difficulty>,
    remaining_reveals: u32,
    levels: [LevelSlot; LEVEL_COUNT as usize],
}

impl GameSession {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty: Some(difficulty),
            remaining_reveals: difficulty.reveals(),
            levels: Default::default(),
        }
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn remaining_reveals(&self) -> u32 {
        self.remaining_reveals
    }

    /// Switches difficulty. A different choice starts over with a full reveal budget.
    /// Returns whether anything changed.
    pub fn set_difficulty(&mut self, difficulty: Option<Difficulty>) -> bool {
        if self.difficulty == difficulty {
            return false;
        }
        self.difficulty = difficulty;
        self.remaining_reveals = difficulty.map_or(0, Difficulty::reveals);
        self.clear_levels();
        true
    }

    /// Drops every level's player and selection. The reveal budget is untouched.
    pub fn clear_levels(&mut self) {
        self.levels = Default::default();
    }

    /// Refills the reveal budget for the current difficulty.
    pub fn refill_reveals(&mut self) {
        self.remaining_reveals = self.difficulty.map_or(0, Difficulty::reveals);
    }

    /// Uses up one reveal. Returns `false` when none were left.
    pub fn spend_reveal(&mut self) -> bool {
        match self.remaining_reveals.checked_sub(1) {
            Some(left) => {
                self.remaining_reveals = left;
                true
            }
            None => false,
        }
    }

    fn slot(&self, level: u8) -> Option<&LevelSlot> {
        usize::from(level)
            .checked_sub(1)
            .and_then(|idx| self.levels.get(idx))
    }

    fn slot_mut(&mut self, level: u8) -> Option<&mut LevelSlot> {
        usize::from(level)
            .checked_sub(1)
            .and_then(|idx| self.levels.get_mut(idx))
    }

    pub fn player(&self, level: u8) -> Option<&str> {
        self.slot(level).and_then(|s| s.player.as_deref())
    }

    pub fn assign_player(&mut self, level: u8, player: String) {
        if let Some(slot) = self.slot_mut(level) {
            slot.player = Some(player);
        }
    }

    pub fn selection(&self, level: u8) -> &[String] {
        self.slot(level)
            .map(|s| s.selection.as_slice())
            .unwrap_or_default()
    }

    pub fn set_selection(&mut self, level: u8, selection: Vec<String>) {
        if let Some(slot) = self.slot_mut(level) {
            slot.selection = selection;
        }
    }

    pub fn push_selection(&mut self, level: u8, team: String) {
        if let Some(slot) = self.slot_mut(level) {
            slot.selection.push(team);
        }
    }

    /// Players assigned to any level other than `level`.
    pub fn players_except(&self, level: u8) -> HashSet<&str> {
        self.levels
            .iter()
            .enumerate()
            .filter(|(idx, _)| idx + 1 != usize::from(level))
            .filter_map(|(_, slot)| slot.player.as_deref())
            .collect()
    }
}

struct SessionEntry {
    game: Arc<Mutex<GameSession>>,
    last_seen: Instant,
}

/// A resolved session for one request.
pub struct SessionHandle {
    pub token: String,
    pub game: Arc<Mutex<GameSession>>,
    /// The token was minted for this request and still has to be sent as a cookie.
    pub is_new: bool,
}

/// In-memory registry of game sessions keyed by cookie token.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionEntry>>,
    max_idle: Duration,
}

impl SessionStore {
    pub fn new(max_idle: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            max_idle,
        }
    }

    /// Looks up the session for `token`, or starts an empty one.
    pub fn resolve(&self, token: Option<&str>) -> SessionHandle {
        if let Some(token) = token {
            if let Some(mut entry) = self.sessions.get_mut(token) {
                entry.last_seen = Instant::now();
                return SessionHandle {
                    token: token.to_string(),
                    game: entry.game.clone(),
                    is_new: false,
                };
            }
        }

        self.evict_idle();

        let token = Ulid::new().to_string();
        let game = Arc::new(Mutex::new(GameSession::default()));
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                game: game.clone(),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!(%token, "started game session");

        SessionHandle {
            token,
            game,
            is_new: true,
        }
    }

    fn evict_idle(&self) {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| entry.last_seen.elapsed() < self.max_idle);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, "evicted idle game sessions");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
