//! One play-through of the hoops arcade.
//!
//! The session owns both of its timers (countdown and power meter) as
//! `IntervalClock`s plus the shot currently in the air. All three are dropped
//! the moment the session leaves `Playing`, so nothing scheduled before the
//! end can touch a finished session.

use super::clock::IntervalClock;
use super::power::PowerOscillator;
use super::shot::{BALL_REST, BallPosition, ShotInFlight, ShotResolution, ShotStage, resolve_shot};
use crate::config::ArcadeConfig;

pub const IDLE_STATUS: &str = "Tap shoot when the meter hits the sweet spot";
pub const TIME_UP_STATUS: &str = "Time's up!";
pub const OUT_OF_SHOTS_STATUS: &str = "Out of balls!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinishReason {
    TimeUp,
    OutOfShots,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub score: u32,
    pub shots_taken: u32,
    pub reason: FinishReason,
}

#[derive(Clone, Copy, Debug)]
enum Due {
    ShotStage,
    PowerTick,
    Countdown,
}

pub struct GameSession {
    cfg: ArcadeConfig,
    phase: Phase,
    time_left: u32,
    shots_remaining: u32,
    score: u32,
    power: PowerOscillator,
    countdown: Option<IntervalClock>,
    meter: Option<IntervalClock>,
    shot: Option<ShotInFlight>,
    status: &'static str,
}

impl GameSession {
    pub fn new(cfg: ArcadeConfig) -> Self {
        let cfg = cfg.sanitized();
        Self {
            phase: Phase::Idle,
            time_left: cfg.session_seconds,
            shots_remaining: cfg.shots_per_session,
            score: 0,
            power: PowerOscillator::new(cfg.power_step),
            countdown: None,
            meter: None,
            shot: None,
            status: IDLE_STATUS,
            cfg,
        }
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.cfg
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn shots_remaining(&self) -> u32 {
        self.shots_remaining
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn power(&self) -> u8 {
        self.power.value()
    }

    pub fn status(&self) -> &'static str {
        self.status
    }

    pub fn shot(&self) -> Option<&ShotInFlight> {
        self.shot.as_ref()
    }

    pub fn ball(&self) -> BallPosition {
        self.shot.map(|s| s.ball()).unwrap_or(BALL_REST)
    }

    pub fn timers_running(&self) -> bool {
        self.countdown.is_some() || self.meter.is_some()
    }

    /// Enter `Playing` with fresh counters. Ignored while already playing.
    pub fn start(&mut self, now: f64) -> bool {
        if self.phase == Phase::Playing {
            return false;
        }
        self.time_left = self.cfg.session_seconds;
        self.shots_remaining = self.cfg.shots_per_session;
        self.score = 0;
        self.power.reset();
        self.shot = None;
        self.status = IDLE_STATUS;
        self.countdown = Some(IntervalClock::new(self.cfg.countdown_tick_ms, now));
        self.meter = Some(IntervalClock::new(self.cfg.power_tick_ms, now));
        self.phase = Phase::Playing;
        log::info!(
            "session started: {}s, {} shots",
            self.time_left,
            self.shots_remaining
        );
        true
    }

    /// Release a shot at the current meter value. Rejected outside `Playing`
    /// and while the previous ball is still in the air.
    pub fn shoot(&mut self, now: f64) -> Option<ShotResolution> {
        let power = self.power.value();
        self.release(now, power)
    }

    pub(crate) fn release(&mut self, now: f64, power: u8) -> Option<ShotResolution> {
        if self.phase != Phase::Playing || self.shot.is_some() {
            return None;
        }
        let resolution = resolve_shot(power, &self.cfg);
        log::debug!(
            "shot at power {} -> {:?} (+{})",
            resolution.power,
            resolution.outcome,
            resolution.points
        );
        self.shot = Some(ShotInFlight::launch(resolution, now, &self.cfg));
        Some(resolution)
    }

    /// Run every timer event due at or before `now`, oldest first. Returns the
    /// summary exactly once, on the call that finishes the session.
    pub fn advance(&mut self, now: f64) -> Option<SessionSummary> {
        while self.phase == Phase::Playing {
            let due = self.next_due(now)?;
            if let Some(summary) = self.apply(due) {
                return Some(summary);
            }
        }
        None
    }

    /// Leave the game from any phase. Returns whether the session had already
    /// finished (and so had produced its summary).
    pub fn exit(&mut self) -> bool {
        let finished = self.phase == Phase::Finished;
        self.stop_timers();
        self.phase = Phase::Idle;
        self.status = IDLE_STATUS;
        finished
    }

    fn next_due(&self, now: f64) -> Option<Due> {
        // Ties resolve in array order: a landing shot counts before the
        // clock can expire on the same instant.
        [
            self.shot.map(|s| (s.stage_ends(), Due::ShotStage)),
            self.meter.map(|c| (c.next_due(), Due::PowerTick)),
            self.countdown.map(|c| (c.next_due(), Due::Countdown)),
        ]
        .into_iter()
        .flatten()
        .filter(|(at, _)| *at <= now)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, due)| due)
    }

    fn apply(&mut self, due: Due) -> Option<SessionSummary> {
        match due {
            Due::ShotStage => {
                let mut shot = self.shot.take()?;
                if shot.advance(&self.cfg) {
                    if shot.stage == ShotStage::Resolved {
                        self.status = shot.resolution.status();
                    }
                    self.shot = Some(shot);
                    return None;
                }
                self.score = self.score.saturating_add(shot.resolution.points);
                self.shots_remaining = self.shots_remaining.saturating_sub(1);
                if self.shots_remaining == 0 {
                    return Some(self.finish(FinishReason::OutOfShots));
                }
                None
            }
            Due::PowerTick => {
                if let Some(meter) = self.meter.as_mut() {
                    meter.consume();
                    self.power.tick();
                }
                None
            }
            Due::Countdown => {
                if let Some(countdown) = self.countdown.as_mut() {
                    countdown.consume();
                    self.time_left = self.time_left.saturating_sub(1);
                }
                if self.time_left == 0 {
                    return Some(self.finish(FinishReason::TimeUp));
                }
                None
            }
        }
    }

    fn finish(&mut self, reason: FinishReason) -> SessionSummary {
        if self.shot.is_some() {
            log::debug!("dropping shot still in flight at session end");
        }
        self.stop_timers();
        self.phase = Phase::Finished;
        self.status = match reason {
            FinishReason::TimeUp => TIME_UP_STATUS,
            FinishReason::OutOfShots => OUT_OF_SHOTS_STATUS,
        };
        let summary = SessionSummary {
            score: self.score,
            shots_taken: self.cfg.shots_per_session - self.shots_remaining,
            reason,
        };
        log::info!("session finished ({:?}) with {} points", reason, summary.score);
        summary
    }

    fn stop_timers(&mut self) {
        self.countdown = None;
        self.meter = None;
        self.shot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLIGHT: f64 = 1_350.0;

    fn started() -> GameSession {
        let mut s = GameSession::new(ArcadeConfig::default());
        assert!(s.start(0.0));
        s
    }

    #[test]
    fn start_resets_counters() {
        let s = started();
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.time_left(), 30);
        assert_eq!(s.shots_remaining(), 15);
        assert_eq!(s.score(), 0);
        assert_eq!(s.power(), 0);
        assert!(s.timers_running());
    }

    #[test]
    fn start_is_ignored_while_playing() {
        let mut s = started();
        s.advance(2_000.0);
        assert!(!s.start(2_000.0));
        assert_eq!(s.time_left(), 28);
    }

    #[test]
    fn perfect_then_undershoot_scenario() {
        let mut s = started();
        assert!(s.release(100.0, 72).is_some());
        // mid-flight: nothing applied yet
        s.advance(100.0 + 700.0);
        assert_eq!(s.shots_remaining(), 15);
        assert_eq!(s.status(), "Perfect swish! +3");
        assert!(s.advance(100.0 + FLIGHT).is_none());
        assert_eq!(s.score(), 3);
        assert_eq!(s.shots_remaining(), 14);

        let t = 100.0 + FLIGHT + 10.0;
        assert!(s.release(t, 15).is_some());
        s.advance(t + FLIGHT);
        assert_eq!(s.score(), 3);
        assert_eq!(s.shots_remaining(), 13);
        assert_eq!(s.status(), "Not enough power...");
    }

    #[test]
    fn second_shot_rejected_while_ball_in_air() {
        let mut s = started();
        assert!(s.release(0.0, 72).is_some());
        assert!(s.release(10.0, 72).is_none());
        s.advance(FLIGHT);
        assert_eq!(s.score(), 3);
        assert_eq!(s.shots_remaining(), 14);
        assert!(s.release(FLIGHT, 72).is_some());
    }

    #[test]
    fn shoot_outside_playing_is_rejected() {
        let mut s = GameSession::new(ArcadeConfig::default());
        assert!(s.shoot(0.0).is_none());
    }

    #[test]
    fn fifteen_shots_finish_the_session() {
        let mut s = started();
        let mut now = 0.0;
        let mut summary = None;
        for _ in 0..15 {
            assert!(s.release(now, 72).is_some());
            now += FLIGHT;
            summary = s.advance(now);
        }
        let summary = summary.expect("finished on last shot");
        assert_eq!(summary.reason, FinishReason::OutOfShots);
        assert_eq!(summary.score, 45);
        assert_eq!(summary.shots_taken, 15);
        assert_eq!(s.phase(), Phase::Finished);
        assert!(!s.timers_running());
        assert!(s.advance(now + 60_000.0).is_none());
    }

    #[test]
    fn countdown_finishes_after_thirty_seconds() {
        let mut s = started();
        assert!(s.advance(29_999.0).is_none());
        assert_eq!(s.time_left(), 1);
        let summary = s.advance(30_000.0).expect("time up");
        assert_eq!(summary.reason, FinishReason::TimeUp);
        assert_eq!(s.status(), TIME_UP_STATUS);
        assert_eq!(s.time_left(), 0);
    }

    #[test]
    fn one_big_jump_finishes_exactly_once() {
        let mut s = started();
        assert!(s.advance(120_000.0).is_some());
        assert!(s.advance(240_000.0).is_none());
        assert_eq!(s.phase(), Phase::Finished);
    }

    #[test]
    fn shot_in_flight_at_time_up_is_dropped() {
        let mut s = started();
        s.advance(29_500.0);
        assert!(s.release(29_500.0, 72).is_some());
        s.advance(29_500.0 + FLIGHT);
        assert_eq!(s.phase(), Phase::Finished);
        assert_eq!(s.score(), 0);
        assert_eq!(s.shots_remaining(), 15);
        assert!(s.shot().is_none());
    }

    #[test]
    fn power_only_moves_while_playing() {
        let mut s = started();
        s.advance(400.0);
        assert_eq!(s.power(), 25);
        s.exit();
        s.advance(10_000.0);
        assert_eq!(s.power(), 25);
    }

    #[test]
    fn exit_cancels_everything() {
        let mut s = started();
        s.release(0.0, 72);
        assert!(!s.exit());
        assert_eq!(s.phase(), Phase::Idle);
        assert!(!s.timers_running());
        assert!(s.shot().is_none());
        assert!(s.advance(100_000.0).is_none());
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn replay_after_finish() {
        let mut s = started();
        s.advance(30_000.0);
        assert_eq!(s.phase(), Phase::Finished);
        assert!(s.start(31_000.0));
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.time_left(), 30);
        assert!(s.advance(31_000.0 + 29_000.0).is_none());
    }
}
