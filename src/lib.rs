//! Portfolio arcade core crate.
//!
//! Interactive pieces of the portfolio site, compiled to WASM:
//! - `arcade`: the hoops mini-game on the contact page, with a weekly
//!   leaderboard kept in local storage (`rankings`).
//! - `guestbook`: visitor comments, likes and replies, also in local storage.
//! - `starfield`: the landing page's collect-the-stars game.
//! - `process`: the design-process platformer with its five step doors.
//!
//! Game rules are plain Rust driven by caller-supplied clocks and a storage
//! port, so everything except the DOM glue is tested natively.

use wasm_bindgen::prelude::*;

pub mod arcade;
pub mod config;
pub mod guestbook;
pub mod process;
pub mod rankings;
pub mod starfield;
pub mod storage;

pub use arcade::{ArcadeController, GameSession, Phase, ShotOutcome, resolve_shot};
pub use config::ArcadeConfig;
pub use rankings::{RankingEntry, RankingStore, week_key_of};
pub use storage::{KeyValueStore, MemoryStorage, StorageError};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second init (hot reload) fails harmlessly.
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Monotonic milliseconds from `performance.now()`; 0 when there is no window.
pub(crate) fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
