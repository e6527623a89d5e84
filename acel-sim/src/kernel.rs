//! cycle scheduler
//!
//! runs clocked components against a shared set of wires. a cycle is
//! two time points: the rising edge, where components drive signals, and
//! the sample point one de-skew delay later, where they observe them.
//! since every write settles before the sample point, the outcome never
//! depends on the order components are listed in.

use crate as sim;
use crate::{Clock, Clocked, NoTrace, Time, Tracer, Wires};

/// delta steps allowed per time point before giving up
pub const MAX_DELTAS: usize = 64;

pub struct Simulation<W: Wires, R: Tracer = NoTrace> {
    clock: Clock,
    wires: W,
    tracer: R,
    scratch: Vec<u8>,
}

impl<W: Wires> Simulation<W, NoTrace> {
    pub fn new(clock: Clock, wires: W) -> Self {
        Self::new_with(clock, wires, NoTrace)
    }
}

impl<W: Wires, R: Tracer> Simulation<W, R> {
    /// create a simulation that records every signal of `wires` to `tracer`
    pub fn new_with(clock: Clock, mut wires: W, mut tracer: R) -> Self {
        wires.visit(&mut |probe| tracer.register(probe.name(), probe.width()));
        // commit reset values written while the wires were built
        wires.update();
        Self { clock, wires, tracer, scratch: Vec::new() }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn wires(&self) -> &W {
        &self.wires
    }

    pub fn wires_mut(&mut self) -> &mut W {
        &mut self.wires
    }

    pub fn tracer(&self) -> &R {
        &self.tracer
    }

    /// run one clock cycle
    pub fn cycle(&mut self, parts: &mut [&mut dyn Clocked<W>]) -> Result<(), sim::Error> {
        log::trace!(target: "acel::sim", "cycle {} @ {}ps", self.clock.cycles(), self.clock.now());

        for part in parts.iter_mut() {
            part.posedge(&mut self.wires, &self.clock)?;
        }
        self.settle(parts)?;
        self.record(self.clock.now());

        for part in parts.iter_mut() {
            part.sample(&mut self.wires, &self.clock)?;
        }
        self.settle(parts)?;
        self.record(self.clock.sample_time());

        self.clock.tick();
        Ok(())
    }

    /// run `n` clock cycles
    pub fn run(&mut self, n: u64, parts: &mut [&mut dyn Clocked<W>]) -> Result<(), sim::Error> {
        for _ in 0..n {
            self.cycle(parts)?;
        }
        Ok(())
    }

    fn settle(&mut self, parts: &mut [&mut dyn Clocked<W>]) -> Result<(), sim::Error> {
        for _ in 0..MAX_DELTAS {
            let changed = self.wires.update();
            let mut active = false;
            for part in parts.iter_mut() {
                active |= part.settle(&mut self.wires, &self.clock)?;
            }
            if !changed && !active {
                return Ok(());
            }
        }
        Err(sim::Error::DeltaOverflow(self.clock.now()))
    }

    fn record(&mut self, time: Time) {
        let tracer = &mut self.tracer;
        let scratch = &mut self.scratch;
        self.wires.visit(&mut |probe| {
            scratch.clear();
            probe.trace_bytes(scratch);
            tracer.record(time, probe.name(), scratch);
        });
    }
}
