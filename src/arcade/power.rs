/// Power meter value bouncing between 0 and 100.
///
/// Moves `step` per tick and reverses at either bound, landing exactly on the
/// bound rather than wrapping past it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerOscillator {
    value: u8,
    step: u8,
    rising: bool,
}

pub const POWER_MAX: u8 = 100;

impl PowerOscillator {
    pub fn new(step: u8) -> Self {
        Self {
            value: 0,
            step: step.clamp(1, POWER_MAX),
            rising: true,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_rising(&self) -> bool {
        self.rising
    }

    pub fn reset(&mut self) {
        self.value = 0;
        self.rising = true;
    }

    pub fn tick(&mut self) -> u8 {
        if self.rising {
            self.value = self.value.saturating_add(self.step).min(POWER_MAX);
            if self.value == POWER_MAX {
                self.rising = false;
            }
        } else {
            self.value = self.value.saturating_sub(self.step);
            if self.value == 0 {
                self.rising = true;
            }
        }
        self.value
    }
}
