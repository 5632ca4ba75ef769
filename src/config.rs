//! Runtime tunables for the arcade.
//!
//! `ArcadeConfig::default()` is the shipped game. The host page may pass a
//! partial JSON document to `start_arcade`; any field it omits keeps its
//! default value.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArcadeConfig {
    /// Countdown length of one session, in whole seconds.
    pub session_seconds: u32,
    /// Shots granted per session.
    pub shots_per_session: u32,
    /// Countdown tick period (ms).
    pub countdown_tick_ms: u32,
    /// Power meter tick period (ms) and step per tick.
    pub power_tick_ms: u32,
    pub power_step: u8,
    /// Sweet spot of the meter and the make bands around it.
    pub sweet_spot: u8,
    pub overshoot_above: u8,
    pub undershoot_below: u8,
    pub perfect_within: u8,
    pub good_within: u8,
    pub decent_within: u8,
    /// Cosmetic shot stage durations (ms).
    pub rising_ms: u32,
    pub at_rim_ms: u32,
    pub resolved_ms: u32,
    pub settling_ms: u32,
    /// How many entries the weekly leaderboard shows.
    pub leaderboard_size: usize,
    pub rankings_key: String,
    pub guestbook_key: String,
    pub default_player_name: String,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            session_seconds: 30,
            shots_per_session: 15,
            countdown_tick_ms: 1_000,
            power_tick_ms: 80,
            power_step: 5,
            sweet_spot: 72,
            overshoot_above: 90,
            undershoot_below: 30,
            perfect_within: 6,
            good_within: 14,
            decent_within: 22,
            rising_ms: 350,
            at_rim_ms: 250,
            resolved_ms: 450,
            settling_ms: 300,
            leaderboard_size: 10,
            rankings_key: "hoops_weekly_rankings".to_string(),
            guestbook_key: "guestbook_comments".to_string(),
            default_player_name: "Anonymous".to_string(),
        }
    }
}

impl ArcadeConfig {
    /// Parse a (possibly partial) JSON config. Falls back to defaults when the
    /// document is malformed; the arcade must still start.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str::<ArcadeConfig>(raw) {
            Ok(cfg) => cfg.sanitized(),
            Err(err) => {
                log::warn!("ignoring malformed arcade config: {err}");
                Self::default()
            }
        }
    }

    /// Clamp values that would stall timers or end a session before it starts.
    pub fn sanitized(mut self) -> Self {
        self.session_seconds = self.session_seconds.max(1);
        self.shots_per_session = self.shots_per_session.max(1);
        self.countdown_tick_ms = self.countdown_tick_ms.max(1);
        self.power_tick_ms = self.power_tick_ms.max(1);
        self.power_step = self.power_step.clamp(1, 100);
        self.sweet_spot = self.sweet_spot.min(100);
        self.leaderboard_size = self.leaderboard_size.max(1);
        for stage in [
            &mut self.rising_ms,
            &mut self.at_rim_ms,
            &mut self.resolved_ms,
            &mut self.settling_ms,
        ] {
            *stage = (*stage).max(1);
        }
        if self.default_player_name.trim().is_empty() {
            self.default_player_name = "Anonymous".to_string();
        }
        self
    }

    /// Total time one shot occupies the hoop, start of rise to end of settle.
    pub fn shot_animation_ms(&self) -> u32 {
        self.rising_ms + self.at_rim_ms + self.resolved_ms + self.settling_ms
    }
}
