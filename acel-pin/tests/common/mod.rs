//! test bench: a scripted target on the pins and a requester on the socket

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use acel_bytes::{Strobe, Word};
use acel_pin::pins::AddrPins;
use acel_pin::{Config, Initiator, Notification, Phase, Pins, SharedTransaction, SyncStatus};
use acel_sim::{self as sim, Clock, Clocked, Listener, Simulation, TraceLog};

pub type Sim = Simulation<Pins, TraceLog>;

/// an address handshake seen by the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub addr: u64,
    pub id: u32,
    pub len: u8,
    pub size: u8,
}

impl Address {
    fn sample(ch: &AddrPins) -> Self {
        Self {
            addr: ch.addr.get(),
            id: ch.id.as_ref().map_or(0, |sig| sig.get()),
            len: ch.len.as_ref().map_or(0, |sig| sig.get()),
            size: ch.size.as_ref().map_or(0, |sig| sig.get()),
        }
    }
}

/// a write-data handshake seen by the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBeat {
    pub data: Word,
    pub strb: Strobe,
    pub last: bool,
}

/// a read beat the target presents once `after` reads were addressed
#[derive(Debug, Clone)]
pub struct ReadBeat {
    pub id: u32,
    pub data: Vec<u8>,
    pub resp: u8,
    pub last: bool,
    pub after: usize,
}

impl ReadBeat {
    pub fn new(id: u32, data: Vec<u8>, last: bool, after: usize) -> Self {
        Self { id, data, resp: 0, last, after }
    }
}

/// a write response the target presents once `after` data beats arrived
#[derive(Debug, Clone)]
pub struct WriteResp {
    pub id: u32,
    pub resp: u8,
    pub after: usize,
}

/// scripted peer driving the ready and response sides of the bus
#[derive(Debug, Default)]
pub struct Target {
    pub reads: Vec<Address>,
    pub writes: Vec<Address>,
    pub beats: Vec<DataBeat>,
    /// hold AR/AW/W ready low
    pub stall: bool,
    /// hold AW ready low for this many more cycles
    pub aw_stall: usize,
    read_script: VecDeque<ReadBeat>,
    write_script: VecDeque<WriteResp>,
    r_taken: bool,
    b_taken: bool,
}

impl Target {
    pub fn respond_read(&mut self, beat: ReadBeat) {
        self.read_script.push_back(beat);
    }

    pub fn respond_write(&mut self, resp: WriteResp) {
        self.write_script.push_back(resp);
    }

    pub fn idle(&self) -> bool {
        self.read_script.is_empty() && self.write_script.is_empty()
    }
}

impl Clocked<Pins> for Target {
    fn posedge(&mut self, pins: &mut Pins, _clock: &Clock) -> Result<(), sim::Error> {
        let ready = !self.stall;
        pins.ar.ready.write(ready);
        pins.aw.ready.write(ready && self.aw_stall == 0);
        pins.w.ready.write(ready);
        self.aw_stall = self.aw_stall.saturating_sub(1);

        if std::mem::take(&mut self.r_taken) {
            self.read_script.pop_front();
        }
        match self.read_script.front() {
            Some(beat) if self.reads.len() >= beat.after => {
                pins.r.valid.write(true);
                pins.r.data.write(Word::from_bytes(&beat.data));
                pins.r.resp.write(beat.resp);
                if let Some(id) = pins.r.id.as_mut() {
                    id.write(beat.id);
                }
                if let Some(last) = pins.r.last.as_mut() {
                    last.write(beat.last);
                }
            }
            _ => pins.r.valid.write(false),
        }

        if std::mem::take(&mut self.b_taken) {
            self.write_script.pop_front();
        }
        match self.write_script.front() {
            Some(resp) if self.beats.len() >= resp.after => {
                pins.b.valid.write(true);
                pins.b.resp.write(resp.resp);
                if let Some(id) = pins.b.id.as_mut() {
                    id.write(resp.id);
                }
            }
            _ => pins.b.valid.write(false),
        }
        Ok(())
    }

    fn sample(&mut self, pins: &mut Pins, _clock: &Clock) -> Result<(), sim::Error> {
        if pins.ar.valid.is_high() && pins.ar.ready.is_high() {
            self.reads.push(Address::sample(&pins.ar));
        }
        if pins.aw.valid.is_high() && pins.aw.ready.is_high() {
            self.writes.push(Address::sample(&pins.aw));
        }
        if pins.w.valid.is_high() && pins.w.ready.is_high() {
            self.beats.push(DataBeat {
                data: pins.w.data.read().clone(),
                strb: pins.w.strb.get(),
                last: pins.w.last.as_ref().map_or(true, |sig| sig.get()),
            });
        }
        self.r_taken = pins.r.valid.is_high() && pins.r.ready.is_high();
        self.b_taken = pins.b.valid.is_high() && pins.b.ready.is_high();
        Ok(())
    }
}

/// requester driving the adapter through its socket
pub struct Bench {
    pub init: Initiator,
    backward: Listener<Notification>,
    issue: VecDeque<SharedTransaction>,
    continue_with: VecDeque<(SharedTransaction, Phase)>,
    sent: Vec<(SharedTransaction, usize)>,
    pub notes: Vec<(Phase, SharedTransaction)>,
    pub done: Vec<SharedTransaction>,
    /// acknowledge right after the end of response when acks are explicit
    pub auto_ack: bool,
}

impl Bench {
    pub fn new(init: Initiator, backward: Listener<Notification>) -> Self {
        Self {
            init,
            backward,
            issue: VecDeque::new(),
            continue_with: VecDeque::new(),
            sent: Vec::new(),
            notes: Vec::new(),
            done: Vec::new(),
            auto_ack: true,
        }
    }

    pub fn submit(&mut self, trans: &SharedTransaction) {
        self.issue.push_back(trans.clone());
    }

    /// backward phases seen for `trans`, oldest first
    pub fn phases(&self, trans: &SharedTransaction) -> Vec<Phase> {
        self.notes
            .iter()
            .filter(|(_, t)| Arc::ptr_eq(t, trans))
            .map(|(phase, _)| *phase)
            .collect()
    }

    pub fn is_done(&self, trans: &SharedTransaction) -> bool {
        self.done.iter().any(|t| Arc::ptr_eq(t, trans))
    }

    pub fn send(&mut self, trans: &SharedTransaction, phase: Phase) {
        assert_eq!(self.init.nb_transport_fw(trans, phase), SyncStatus::Accepted);
    }

    fn beats_sent(&mut self, trans: &SharedTransaction) -> usize {
        match self.sent.iter_mut().find(|(t, _)| Arc::ptr_eq(t, trans)) {
            Some((_, sent)) => {
                *sent += 1;
                *sent
            }
            None => {
                self.sent.push((trans.clone(), 1));
                1
            }
        }
    }

    fn pump(&mut self) {
        while let Some(note) = self.backward.poll() {
            let trans = note.trans;
            self.notes.push((note.phase, trans.clone()));
            match note.phase {
                Phase::EndPartialReq => {
                    let sent = self.beats_sent(&trans);
                    let beats = trans.lock().beats();
                    let phase = if sent + 1 >= beats { Phase::BeginReq } else { Phase::BeginPartialReq };
                    self.continue_with.push_back((trans, phase));
                }
                Phase::BeginPartialResp => self.send(&trans, Phase::EndPartialResp),
                Phase::BeginResp => {
                    self.send(&trans, Phase::EndResp);
                    if self.init.config().explicit_ack && self.auto_ack {
                        self.send(&trans, Phase::Ack);
                    }
                    self.done.push(trans);
                }
                _ => (),
            }
        }

        while let Some((trans, phase)) = self.continue_with.pop_front() {
            if self.init.nb_transport_fw(&trans, phase) == SyncStatus::Rejected {
                self.continue_with.push_front((trans, phase));
                return;
            }
        }

        while let Some(trans) = self.issue.front() {
            let phase = {
                let t = trans.lock();
                if t.is_write() && t.beats() > 1 {
                    Phase::BeginPartialReq
                } else {
                    Phase::BeginReq
                }
            };
            if self.init.nb_transport_fw(trans, phase) == SyncStatus::Rejected {
                return;
            }
            self.issue.pop_front();
        }
    }
}

impl Clocked<Pins> for Bench {
    fn posedge(&mut self, pins: &mut Pins, clock: &Clock) -> Result<(), sim::Error> {
        self.init.posedge(pins, clock)
    }

    fn sample(&mut self, pins: &mut Pins, clock: &Clock) -> Result<(), sim::Error> {
        self.init.sample(pins, clock)
    }

    fn settle(&mut self, pins: &mut Pins, clock: &Clock) -> Result<bool, sim::Error> {
        let active = self.init.settle(pins, clock)?;
        self.pump();
        Ok(active)
    }
}

pub fn setup(config: Config) -> (Sim, Bench, Target) {
    env_logger::try_init().ok();
    let pins = Pins::new("top", &config).unwrap();
    let (init, backward) = Initiator::new("init", config.clone(), &pins).unwrap();
    let sim = Simulation::new_with(config.clock().unwrap(), pins, TraceLog::new());
    (sim, Bench::new(init, backward), Target::default())
}

pub fn run(sim: &mut Sim, bench: &mut Bench, target: &mut Target, cycles: u64) -> Result<(), sim::Error> {
    let parts: &mut [&mut dyn Clocked<Pins>] = &mut [bench, target];
    sim.run(cycles, parts)
}

/// (rise, fall) times of a 1-bit signal
pub fn pulses(trace: &TraceLog, name: &str) -> Vec<(u64, u64)> {
    let mut out = Vec::new();
    let mut rise = None;
    for (time, value) in trace.history(name) {
        match (value, rise) {
            ([1], None) => rise = Some(time),
            ([0], Some(start)) => {
                out.push((start, time));
                rise = None;
            }
            _ => (),
        }
    }
    out
}

pub fn bytes(start: u8, len: usize) -> Vec<u8> {
    (0..len).map(|i| start.wrapping_add(i as u8)).collect()
}
