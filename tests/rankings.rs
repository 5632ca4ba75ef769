// Weekly leaderboard behaviour over an in-memory store.

use chrono::{DateTime, Duration, TimeZone, Utc};
use portfolio_arcade::rankings::FixedClock;
use portfolio_arcade::{KeyValueStore, MemoryStorage, RankingEntry, RankingStore, week_key_of};

const KEY: &str = "hoops_weekly_rankings";

fn friday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, 0).unwrap()
}

fn store() -> RankingStore<MemoryStorage, FixedClock> {
    RankingStore::with_clock(MemoryStorage::new(), FixedClock::new(friday()), KEY, 10)
}

#[test]
fn every_returned_entry_belongs_to_this_week() {
    let mut s = store();
    for day in 0..21 {
        let at = friday() - Duration::days(day);
        s.submit(RankingEntry::new(format!("d{day}"), day as u32, at));
    }
    let week = week_key_of(&friday());
    let top = s.current_week_rankings();
    assert!(!top.is_empty());
    assert!(top.len() <= 10);
    assert!(top.iter().all(|e| e.week_key == week));
    // Sunday 2026-10-11 through Friday: six days
    assert_eq!(top.len(), 6);
    assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn submitted_entry_shows_only_if_top_ten() {
    let mut s = store();
    for score in 10..20 {
        s.submit(RankingEntry::new("regular", score, friday()));
    }
    let low = RankingEntry::new("low", 3, friday() + Duration::seconds(1));
    s.submit(low.clone());
    assert!(!s.current_week_rankings().contains(&low));

    let high = RankingEntry::new("high", 40, friday() + Duration::seconds(2));
    s.submit(high.clone());
    let top = s.current_week_rankings();
    assert_eq!(top[0], high);
    assert_eq!(top.len(), 10);
    assert_eq!(s.load().len(), 12);
}

#[test]
fn reads_are_idempotent() {
    let mut s = store();
    s.record("a", 7);
    s.record("b", 9);
    assert_eq!(s.current_week_rankings(), s.current_week_rankings());
}

#[test]
fn stored_json_uses_camel_case_week_key() {
    let mut s = store();
    s.record("a", 7);
    let raw = s.storage().get(KEY).unwrap().unwrap();
    assert!(raw.contains("\"weekKey\":\"2026-42\""));
}

#[test]
fn week_key_is_not_recomputed_on_read() {
    // An entry whose stored key disagrees with its date is trusted as stored.
    let raw = r#"[{"id":1,"name":"x","score":5,"date":"2020-01-01T00:00:00Z","weekKey":"2026-42"}]"#;
    let s = RankingStore::with_clock(
        MemoryStorage::new().with_item(KEY, raw),
        FixedClock::new(friday()),
        KEY,
        10,
    );
    assert_eq!(s.current_week_rankings().len(), 1);
}
