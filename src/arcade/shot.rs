//! Shot resolution and the cosmetic flight of the ball.
//!
//! A shot's outcome is decided the instant it is released. The flight that
//! follows (`Rising -> AtRim -> Resolved -> Settling`) is pure presentation;
//! the session applies points only once the flight has settled.

use crate::config::ArcadeConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShotOutcome {
    Perfect,
    Good,
    Decent,
    RimOut,
    Overshoot,
    Undershoot,
}

impl ShotOutcome {
    pub fn points(self) -> u32 {
        match self {
            ShotOutcome::Perfect => 3,
            ShotOutcome::Good => 2,
            ShotOutcome::Decent => 1,
            ShotOutcome::RimOut | ShotOutcome::Overshoot | ShotOutcome::Undershoot => 0,
        }
    }

    pub fn is_make(self) -> bool {
        self.points() > 0
    }

    pub fn status(self) -> &'static str {
        match self {
            ShotOutcome::Perfect => "Perfect swish! +3",
            ShotOutcome::Good => "Nice shot! +2",
            ShotOutcome::Decent => "Lucky bounce, it drops! +1",
            ShotOutcome::RimOut => "Rimmed out!",
            ShotOutcome::Overshoot => "Way too much power!",
            ShotOutcome::Undershoot => "Not enough power...",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShotResolution {
    pub power: u8,
    pub outcome: ShotOutcome,
    pub points: u32,
}

impl ShotResolution {
    pub fn status(&self) -> &'static str {
        self.outcome.status()
    }
}

/// Decide a shot from the captured meter value. Out-of-band power misses
/// before distance to the sweet spot is considered.
pub fn resolve_shot(power: u8, cfg: &ArcadeConfig) -> ShotResolution {
    let outcome = if power > cfg.overshoot_above {
        ShotOutcome::Overshoot
    } else if power < cfg.undershoot_below {
        ShotOutcome::Undershoot
    } else {
        let distance = power.abs_diff(cfg.sweet_spot);
        if distance <= cfg.perfect_within {
            ShotOutcome::Perfect
        } else if distance <= cfg.good_within {
            ShotOutcome::Good
        } else if distance <= cfg.decent_within {
            ShotOutcome::Decent
        } else {
            ShotOutcome::RimOut
        }
    };
    ShotResolution {
        power,
        outcome,
        points: outcome.points(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotStage {
    Rising,
    AtRim,
    Resolved,
    Settling,
}

impl ShotStage {
    /// `None` once the ball has settled.
    pub fn next(self) -> Option<ShotStage> {
        match self {
            ShotStage::Rising => Some(ShotStage::AtRim),
            ShotStage::AtRim => Some(ShotStage::Resolved),
            ShotStage::Resolved => Some(ShotStage::Settling),
            ShotStage::Settling => None,
        }
    }

    fn prev(self) -> Option<ShotStage> {
        match self {
            ShotStage::Rising => None,
            ShotStage::AtRim => Some(ShotStage::Rising),
            ShotStage::Resolved => Some(ShotStage::AtRim),
            ShotStage::Settling => Some(ShotStage::Resolved),
        }
    }

    pub fn duration_ms(self, cfg: &ArcadeConfig) -> u32 {
        match self {
            ShotStage::Rising => cfg.rising_ms,
            ShotStage::AtRim => cfg.at_rim_ms,
            ShotStage::Resolved => cfg.resolved_ms,
            ShotStage::Settling => cfg.settling_ms,
        }
    }
}

/// Ball position in percent of the court (x from the left, y from the top).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallPosition {
    pub x: f64,
    pub y: f64,
}

pub const BALL_REST: BallPosition = BallPosition { x: 50.0, y: 85.0 };
pub const RIM: BallPosition = BallPosition { x: 50.0, y: 28.0 };

/// Where the ball sits at the end of `stage` for a shot that ends in `outcome`.
pub fn ball_position(outcome: ShotOutcome, stage: ShotStage) -> BallPosition {
    use ShotOutcome::*;
    use ShotStage::*;
    match (stage, outcome) {
        (Settling, _) => BALL_REST,
        (Rising, Overshoot) => BallPosition { x: 50.0, y: 12.0 },
        (Rising, Undershoot) => BallPosition { x: 50.0, y: 50.0 },
        (Rising, _) => BallPosition { x: 50.0, y: 22.0 },
        (AtRim, Overshoot) => BallPosition { x: 54.0, y: 8.0 },
        (AtRim, Undershoot) => BallPosition { x: 50.0, y: 42.0 },
        (AtRim, RimOut) => BallPosition { x: 56.0, y: 27.0 },
        (AtRim, _) => RIM,
        (Resolved, Perfect | Good | Decent) => BallPosition { x: 50.0, y: 45.0 },
        (Resolved, RimOut) => BallPosition { x: 72.0, y: 55.0 },
        (Resolved, Overshoot) => BallPosition { x: 62.0, y: 70.0 },
        (Resolved, Undershoot) => BallPosition { x: 50.0, y: 80.0 },
    }
}

/// A released shot while its flight plays out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotInFlight {
    pub resolution: ShotResolution,
    pub stage: ShotStage,
    stage_ends_ms: f64,
}

impl ShotInFlight {
    pub fn launch(resolution: ShotResolution, now: f64, cfg: &ArcadeConfig) -> Self {
        Self {
            resolution,
            stage: ShotStage::Rising,
            stage_ends_ms: now + f64::from(ShotStage::Rising.duration_ms(cfg)),
        }
    }

    pub fn stage_ends(&self) -> f64 {
        self.stage_ends_ms
    }

    pub fn ball(&self) -> BallPosition {
        ball_position(self.resolution.outcome, self.stage)
    }

    /// Ball position at `now`, eased linearly from where the previous stage
    /// left it.
    pub fn ball_at(&self, now: f64, cfg: &ArcadeConfig) -> BallPosition {
        let outcome = self.resolution.outcome;
        let from = self
            .stage
            .prev()
            .map(|p| ball_position(outcome, p))
            .unwrap_or(BALL_REST);
        let to = ball_position(outcome, self.stage);
        let duration = f64::from(self.stage.duration_ms(cfg));
        let t = (1.0 - (self.stage_ends_ms - now) / duration).clamp(0.0, 1.0);
        BallPosition {
            x: from.x + (to.x - from.x) * t,
            y: from.y + (to.y - from.y) * t,
        }
    }

    /// Move to the next stage. Returns false when the flight has settled.
    pub fn advance(&mut self, cfg: &ArcadeConfig) -> bool {
        match self.stage.next() {
            Some(next) => {
                self.stage = next;
                self.stage_ends_ms += f64::from(next.duration_ms(cfg));
                true
            }
            None => false,
        }
    }
}
