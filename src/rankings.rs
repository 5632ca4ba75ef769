//! Weekly leaderboard persisted in local storage.
//!
//! All weeks live in one JSON list under a single key; reads filter to the
//! current week. Entries are written once and never edited.

use std::cell::Cell;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, StorageError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub id: i64,
    pub name: String,
    pub score: u32,
    pub date: DateTime<Utc>,
    pub week_key: String,
}

impl RankingEntry {
    /// The week key is fixed here, at creation, from `date`.
    pub fn new(name: impl Into<String>, score: u32, date: DateTime<Utc>) -> Self {
        Self {
            id: date.timestamp_millis(),
            name: name.into(),
            score,
            date,
            week_key: week_key_of(&date),
        }
    }
}

/// `YYYY-WW`. Weeks start on Sunday; week 1 is the (possibly partial) week
/// containing January 1st.
pub fn week_key_of<D: Datelike>(date: &D) -> String {
    let day = date.ordinal0();
    let weekday = date.weekday().num_days_from_sunday();
    // Weekday of January 1st, recovered from today's weekday.
    let jan1_offset = (weekday + 7 - day % 7) % 7;
    let week = (day + jan1_offset) / 7 + 1;
    format!("{}-{:02}", date.year(), week)
}

/// Source of "now" for entry dates and the current week.
pub trait WallClock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock(Cell<DateTime<Utc>>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(Cell::new(at))
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.0.set(at);
    }
}

impl WallClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}

pub struct RankingStore<S, C = SystemClock> {
    storage: S,
    clock: C,
    key: String,
    limit: usize,
}

impl<S: KeyValueStore> RankingStore<S, SystemClock> {
    pub fn new(storage: S, key: impl Into<String>, limit: usize) -> Self {
        Self::with_clock(storage, SystemClock, key, limit)
    }
}

impl<S: KeyValueStore, C: WallClock> RankingStore<S, C> {
    pub fn with_clock(storage: S, clock: C, key: impl Into<String>, limit: usize) -> Self {
        Self {
            storage,
            clock,
            key: key.into(),
            limit,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Every stored entry, all weeks. Missing or unreadable data reads as empty.
    pub fn load(&self) -> Vec<RankingEntry> {
        match self.try_load() {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("rankings unreadable, treating as empty: {err}");
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> Result<Vec<RankingEntry>, StorageError> {
        match self.storage.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Top entries of the week containing "now", best score first. Equal
    /// scores keep submission order.
    pub fn current_week_rankings(&self) -> Vec<RankingEntry> {
        let week = week_key_of(&self.clock.now());
        let mut entries: Vec<RankingEntry> = self
            .load()
            .into_iter()
            .filter(|e| e.week_key == week)
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(self.limit);
        entries
    }

    /// Append to the full list and write it back. Write failures are logged
    /// and dropped. Unreadable data counts as an empty list, so submitting
    /// over it leaves only the new entry.
    pub fn submit(&mut self, entry: RankingEntry) {
        let mut entries = self.load();
        entries.push(entry);
        if let Err(err) = self.write(&entries) {
            log::warn!("could not save rankings: {err}");
        }
    }

    /// Create an entry stamped with the store's clock and submit it.
    pub fn record(&mut self, name: &str, score: u32) -> RankingEntry {
        let entry = RankingEntry::new(name, score, self.clock.now());
        log::info!(
            "recording {} points for {} in week {}",
            entry.score,
            entry.name,
            entry.week_key
        );
        self.submit(entry.clone());
        entry
    }

    fn write(&mut self, entries: &[RankingEntry]) -> Result<(), StorageError> {
        let json = serde_json::to_string(entries)?;
        self.storage.set(&self.key, &json)
    }

    /// Drop the whole list if any entry predates week keys. Returns whether a
    /// reset happened.
    // NOTE: destructive on purpose; old-format entries cannot be placed in a week.
    pub fn reset_if_legacy(&mut self) -> bool {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(err) => {
                log::warn!("rankings unreadable, skipping legacy check: {err}");
                return false;
            }
        };
        let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(&raw) else {
            return false;
        };
        let legacy = values
            .iter()
            .any(|v| !v.get("weekKey").is_some_and(|k| k.is_string()));
        if !legacy {
            return false;
        }
        log::info!("clearing {} legacy ranking entries", values.len());
        if let Err(err) = self.storage.remove(&self.key) {
            log::warn!("could not clear legacy rankings: {err}");
        }
        true
    }
}
