// Fixed-interval timer driven by an external millisecond clock.

/// IntervalClock tracks when the next tick of a fixed period is due.
/// Ticks are consumed one at a time so a late frame can catch up on every
/// tick it skipped, in order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntervalClock {
    period_ms: f64,
    next_due_ms: f64,
}

impl IntervalClock {
    /// First tick is one full period after `now`.
    pub fn new(period_ms: u32, now: f64) -> Self {
        let period_ms = f64::from(period_ms.max(1));
        Self {
            period_ms,
            next_due_ms: now + period_ms,
        }
    }

    pub fn next_due(&self) -> f64 {
        self.next_due_ms
    }

    pub fn is_due(&self, now: f64) -> bool {
        now >= self.next_due_ms
    }

    /// Consume one tick, returning the instant it was scheduled for.
    pub fn consume(&mut self) -> f64 {
        let due = self.next_due_ms;
        self.next_due_ms += self.period_ms;
        due
    }
}
