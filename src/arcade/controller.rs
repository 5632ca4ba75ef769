//! Session + leaderboard glue: one ranking entry per finished session.

use super::session::{GameSession, Phase};
use super::shot::ShotResolution;
use crate::config::ArcadeConfig;
use crate::rankings::{RankingEntry, RankingStore, SystemClock, WallClock};
use crate::storage::KeyValueStore;

pub struct ArcadeController<S, C = SystemClock> {
    session: GameSession,
    rankings: RankingStore<S, C>,
    player_name: String,
    default_name: String,
    last_entry: Option<RankingEntry>,
    recorded_unseen: bool,
}

impl<S: KeyValueStore> ArcadeController<S, SystemClock> {
    pub fn new(cfg: ArcadeConfig, storage: S) -> Self {
        Self::with_clock(cfg, storage, SystemClock)
    }
}

impl<S: KeyValueStore, C: WallClock> ArcadeController<S, C> {
    /// Legacy leaderboard data is cleared here, once, before anything reads it.
    pub fn with_clock(cfg: ArcadeConfig, storage: S, clock: C) -> Self {
        let cfg = cfg.sanitized();
        let mut rankings =
            RankingStore::with_clock(storage, clock, cfg.rankings_key.clone(), cfg.leaderboard_size);
        rankings.reset_if_legacy();
        Self {
            default_name: cfg.default_player_name.clone(),
            session: GameSession::new(cfg),
            rankings,
            player_name: String::new(),
            last_entry: None,
            recorded_unseen: false,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn rankings(&self) -> &RankingStore<S, C> {
        &self.rankings
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.player_name = name.trim().to_string();
    }

    /// Name that goes on the leaderboard.
    pub fn player_name(&self) -> &str {
        if self.player_name.is_empty() {
            &self.default_name
        } else {
            &self.player_name
        }
    }

    /// Entry recorded for the most recent finished session, if any.
    pub fn last_entry(&self) -> Option<&RankingEntry> {
        self.last_entry.as_ref()
    }

    /// True once after each recorded entry, whichever call recorded it.
    /// The view polls this to know when the leaderboard changed.
    pub fn take_recorded(&mut self) -> bool {
        std::mem::take(&mut self.recorded_unseen)
    }

    pub fn current_week_rankings(&self) -> Vec<RankingEntry> {
        self.rankings.current_week_rankings()
    }

    pub fn start(&mut self, now: f64) -> bool {
        let started = self.session.start(now);
        if started {
            self.last_entry = None;
        }
        started
    }

    /// Timers are caught up first so a press that lands after the buzzer is
    /// rejected instead of scored. If that catch-up finishes the session the
    /// entry is still recorded; see `take_recorded`.
    pub fn shoot(&mut self, now: f64) -> Option<ShotResolution> {
        if self.advance(now).is_some() {
            return None;
        }
        self.session.shoot(now)
    }

    /// Drive the session to `now`. Returns the ranking entry on the call
    /// that finishes the session.
    pub fn advance(&mut self, now: f64) -> Option<RankingEntry> {
        let summary = self.session.advance(now)?;
        let name = self.player_name().to_string();
        let entry = self.rankings.record(&name, summary.score);
        self.last_entry = Some(entry.clone());
        self.recorded_unseen = true;
        Some(entry)
    }

    /// Hand control back to the page. Returns whether this session's score
    /// made it onto the leaderboard.
    pub fn exit(&mut self) -> bool {
        let was = self.session.phase();
        let finished = self.session.exit();
        if was == Phase::Playing {
            log::info!("left mid-game, nothing recorded");
        }
        finished && self.last_entry.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rankings::FixedClock;
    use crate::storage::MemoryStorage;
    use chrono::{TimeZone, Utc};

    fn controller() -> ArcadeController<MemoryStorage, FixedClock> {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 18, 30, 0).unwrap();
        ArcadeController::with_clock(
            ArcadeConfig::default(),
            MemoryStorage::new(),
            FixedClock::new(now),
        )
    }

    #[test]
    fn finishing_records_exactly_one_entry() {
        let mut c = controller();
        c.set_player_name("  Kofi ");
        c.start(0.0);
        let entry = c.advance(30_000.0).expect("time up");
        assert_eq!(entry.name, "Kofi");
        assert_eq!(entry.score, 0);
        assert!(c.advance(90_000.0).is_none());
        assert_eq!(c.rankings().load().len(), 1);
        assert!(c.exit());
    }

    #[test]
    fn exit_mid_game_records_nothing() {
        let mut c = controller();
        c.start(0.0);
        c.shoot(100.0);
        c.advance(5_000.0);
        assert!(!c.exit());
        assert!(c.rankings().load().is_empty());
        assert!(c.advance(60_000.0).is_none());
    }

    #[test]
    fn blank_name_uses_placeholder() {
        let mut c = controller();
        c.set_player_name("   ");
        c.start(0.0);
        let entry = c.advance(30_000.0).unwrap();
        assert_eq!(entry.name, "Anonymous");
    }

    #[test]
    fn late_press_after_buzzer_is_not_a_shot() {
        let mut c = controller();
        c.start(0.0);
        assert!(c.shoot(31_000.0).is_none());
        assert_eq!(c.rankings().load().len(), 1);
        assert!(c.last_entry().is_some());
    }

    #[test]
    fn entry_recorded_by_a_late_press_is_reported_once() {
        let mut c = controller();
        c.start(0.0);
        assert!(c.advance(29_995.0).is_none());
        assert!(!c.take_recorded());
        assert!(c.shoot(30_005.0).is_none());
        assert!(c.advance(30_011.0).is_none());
        assert_eq!(c.session().phase(), Phase::Finished);
        assert_eq!(c.rankings().load().len(), 1);
        assert!(c.take_recorded());
        assert!(!c.take_recorded());
    }

    #[test]
    fn legacy_store_is_cleared_on_construction() {
        let cfg = ArcadeConfig::default();
        let storage = MemoryStorage::new().with_item(&cfg.rankings_key, r#"[{"id":1,"name":"x","score":2}]"#);
        let c = ArcadeController::with_clock(
            cfg,
            storage,
            FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap()),
        );
        assert!(c.rankings().load().is_empty());
        assert!(c.current_week_rankings().is_empty());
    }
}
