//! simulation types
//!
//! various types used across the simulation module

use crate as sim;

/// simulated time in picoseconds
pub type Time = u64;

/// a simulation clock is a time source
///
/// each cycle has two time points: the rising edge at `now()`, where
/// signals are driven, and the de-skewed sample point `deskew` later, where
/// they are observed
#[derive(Debug, Clone)]
pub struct Clock {
    period: Time,
    deskew: Time,
    cycles: u64,
}

impl Clock {
    /// create a new clock with the given period and default de-skew
    pub fn new(period: Time) -> Result<Self, sim::Error> {
        Self::new_with(period, sim::DEFAULT_DESKEW)
    }

    /// create a new clock with specified period and de-skew delay
    ///
    /// errors if the sample point does not fall in the first half period
    pub fn new_with(period: Time, deskew: Time) -> Result<Self, sim::Error> {
        if deskew == 0 || deskew.saturating_mul(2) >= period {
            return Err(sim::Error::Clock(format!(
                "failed to create clock with period {}ps and de-skew {}ps",
                period, deskew
            )));
        }
        Ok(Self { period, deskew, cycles: 0 })
    }

    pub fn period(&self) -> Time {
        self.period
    }

    pub fn deskew(&self) -> Time {
        self.deskew
    }

    /// rising edges elapsed since instantiation
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// time of the current rising edge
    pub fn now(&self) -> Time {
        self.cycles * self.period
    }

    /// time of the current de-skewed sample point
    pub fn sample_time(&self) -> Time {
        self.now() + self.deskew
    }

    /// advance to the next rising edge
    pub fn tick(&mut self) {
        self.cycles += 1
    }
}
