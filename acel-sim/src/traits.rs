//! simulation traits
//!
//! `Wires` is the set of signals shared by all components of a
//! simulation; `Clocked` is a component reacting to the clock.

use crate as sim;
use crate::{Clock, Probe};

/// a bundle of signals
pub trait Wires {
    fn visit(&self, f: &mut dyn FnMut(&dyn Probe));

    fn visit_mut(&mut self, f: &mut dyn FnMut(&mut dyn Probe));

    /// commit every pending write; true if any committed value changed
    fn update(&mut self) -> bool {
        let mut changed = false;
        self.visit_mut(&mut |probe| changed |= probe.update());
        changed
    }
}

/// clocked trait
///
/// implementation implies that actions must be taken at each step of the
/// simulation clock. within one cycle the scheduler calls `posedge` on
/// every component, settles, calls `sample` at the de-skewed sample point
/// and settles again. writes made in any of these are only visible to
/// readers after the next settle step commits them.
pub trait Clocked<W> {
    /// rising clock edge
    fn posedge(&mut self, _wires: &mut W, _clock: &Clock) -> Result<(), sim::Error> {
        Ok(())
    }

    /// de-skewed sample point
    fn sample(&mut self, _wires: &mut W, _clock: &Clock) -> Result<(), sim::Error> {
        Ok(())
    }

    /// one delta step; returns true if the component did any work
    fn settle(&mut self, _wires: &mut W, _clock: &Clock) -> Result<bool, sim::Error> {
        Ok(false)
    }
}
