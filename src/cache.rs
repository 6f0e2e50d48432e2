//! Time-bounded read cache in front of the appearances queries.
//!
//! The cache is shared by every game session. Stale reads within the TTL are
//! fine because the underlying data only changes when new games are loaded.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::NaiveDate;
use color_eyre::Result;
use lru::LruCache;
use tokio::time::Instant;

use crate::models::PlayerRecord;
use crate::services::quiz::AppearanceRepository;

/// Player records kept at most; the least recently used one goes first.
const PLAYER_RECORD_CAPACITY: usize = 1024;
const THRESHOLD_CAPACITY: usize = 64;

/// LRU cache whose entries also expire `ttl` after insertion.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<LruCache<K, (Instant, V)>>,
}

impl<K: Hash + Eq + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<K, (Instant, V)>> {
        // Entries are plain values, a panic elsewhere cannot leave them half-written.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries();
        let hit = entries
            .get(key)
            .map(|(inserted_at, value)| (inserted_at.elapsed() < self.ttl, value.clone()));
        match hit {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value`, dropping every entry whose TTL has run out.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries();
        let expired: Vec<K> = entries
            .iter()
            .filter(|(_, (inserted_at, _))| inserted_at.elapsed() >= self.ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        entries.put(key, (Instant::now(), value));
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// [`AppearanceRepository`] that remembers successful answers of `R` for a fixed TTL.
pub struct CachedRepository<R> {
    inner: R,
    latest_game_date: TtlCache<(), NaiveDate>,
    players: TtlCache<i32, Vec<String>>,
    player_records: TtlCache<String, PlayerRecord>,
    teams: TtlCache<(), Vec<String>>,
}

impl<R> CachedRepository<R> {
    pub fn new(inner: R, ttl: Duration) -> Self {
        Self {
            inner,
            latest_game_date: TtlCache::new(ttl, 1),
            players: TtlCache::new(ttl, THRESHOLD_CAPACITY),
            player_records: TtlCache::new(ttl, PLAYER_RECORD_CAPACITY),
            teams: TtlCache::new(ttl, 1),
        }
    }

    /// Forget everything so the next read goes to the store.
    pub fn clear(&self) {
        self.latest_game_date.clear();
        self.players.clear();
        self.player_records.clear();
        self.teams.clear();
        tracing::info!("read cache cleared");
    }
}

impl<R: AppearanceRepository> AppearanceRepository for CachedRepository<R> {
    async fn latest_game_date(&self) -> Result<NaiveDate> {
        if let Some(date) = self.latest_game_date.get(&()) {
            return Ok(date);
        }
        let date = self.inner.latest_game_date().await?;
        self.latest_game_date.insert((), date);
        Ok(date)
    }

    async fn players(&self, min_seasons: i32) -> Result<Vec<String>> {
        if let Some(players) = self.players.get(&min_seasons) {
            return Ok(players);
        }
        let players = self.inner.players(min_seasons).await?;
        self.players.insert(min_seasons, players.clone());
        Ok(players)
    }

    async fn player_record(&self, player_name: &str) -> Result<PlayerRecord> {
        let key = player_name.to_string();
        if let Some(record) = self.player_records.get(&key) {
            return Ok(record);
        }
        let record = self.inner.player_record(player_name).await?;
        self.player_records.insert(key, record.clone());
        Ok(record)
    }

    async fn teams(&self) -> Result<Vec<String>> {
        if let Some(teams) = self.teams.get(&()) {
            return Ok(teams);
        }
        let teams = self.inner.teams().await?;
        self.teams.insert((), teams.clone());
        Ok(teams)
    }
}
