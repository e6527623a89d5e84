//! the pin-level initiator
//!
//! `Core` is the state reactions operate on; `Initiator` wires it to the
//! socket, the reaction table and the five channel drivers, and plugs the
//! whole adapter into a simulation as a clocked component.

use acel_sim::{self as sim, event, Clock, Clocked, Listener, Notifier, Time};
use ustr::Ustr;

use crate::bookkeeping::{ActiveSlots, Handle, HandleId, Handles, Outstanding};
use crate::callbacks::{reaction_table, WriteBeat};
use crate::config::{Config, ConfigError};
use crate::driver::{AddressDriver, Reactor, ResponseDriver, WriteDataDriver};
use crate::error::{Error, Violation};
use crate::phase::{Notification, Phase, ReactionTable, SyncStatus, TimePoint};
use crate::pins::Pins;
use crate::protocol::{Command, SharedTransaction, Status};
use crate::socket::{Forward, Ingress};

/// driver wake-ups
pub(crate) struct Events {
    pub ar: Notifier,
    pub aw: Notifier,
    pub wdata: Notifier<WriteBeat>,
    pub r_release: Notifier,
    pub b_release: Notifier,
}

struct Wakes {
    ar: Listener,
    aw: Listener,
    wdata: Listener<WriteBeat>,
    r_release: Listener,
    b_release: Listener,
}

fn events(name: &str) -> (Events, Wakes) {
    let (ar, ar_wake) = event(&format!("{}.ar", name));
    let (aw, aw_wake) = event(&format!("{}.aw", name));
    let (wdata, wdata_wake) = event(&format!("{}.wdata", name));
    let (r_release, r_wake) = event(&format!("{}.r_release", name));
    let (b_release, b_wake) = event(&format!("{}.b_release", name));
    (
        Events { ar, aw, wdata, r_release, b_release },
        Wakes { ar: ar_wake, aw: aw_wake, wdata: wdata_wake, r_release: r_wake, b_release: b_wake },
    )
}

/// adapter state shared by all reactions
pub struct Core {
    name: Ustr,
    config: Config,
    handles: Handles,
    outstanding: Outstanding,
    slots: ActiveSlots,
    counters: [usize; 2],
    write_burst: Option<HandleId>,
    aw_pending: Option<HandleId>,
    events: Events,
    upstream: Notifier<Notification>,
}

impl Core {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn handles(&self) -> &Handles {
        &self.handles
    }

    /// requests begun and not yet acknowledged
    pub fn outstanding(&self, command: Command) -> usize {
        self.counters[command.index()]
    }

    /// requests ended and waiting for their response under `id`
    pub fn queued(&self, command: Command, id: u32) -> usize {
        self.outstanding.len(command, id)
    }

    /// the request currently driving `command`'s address/data channel
    pub fn active(&self, command: Command) -> Option<HandleId> {
        self.slots.get(command)
    }

    /// the write burst whose data beats are in flight
    pub fn write_burst(&self) -> Option<HandleId> {
        self.write_burst
    }

    /// the write whose address is driven on AW but not yet taken
    pub fn address_pending(&self) -> Option<HandleId> {
        self.aw_pending
    }

    pub(crate) fn bus_bytes(&self) -> usize {
        self.config.bus_bytes()
    }

    pub(crate) fn addr_mask(&self) -> u64 {
        self.config.addr_mask()
    }

    /// delay reported with end-of-request phases: one tick short of the
    /// next sample point
    pub(crate) fn request_delay(&self) -> Time {
        self.config.clock_period.saturating_sub(self.config.deskew + 1)
    }

    pub(crate) fn events(&self) -> &Events {
        &self.events
    }

    pub(crate) fn handle(&self, handle: HandleId) -> Result<&Handle, Error> {
        self.handles.get(handle).ok_or(Error::UnknownTransaction)
    }

    pub(crate) fn handle_mut(&mut self, handle: HandleId) -> Result<&mut Handle, Error> {
        self.handles.get_mut(handle).ok_or(Error::UnknownTransaction)
    }

    fn admit(&mut self, trans: &SharedTransaction) -> HandleId {
        let handle = self.handles.create(trans);
        let mask = self.config.id_mask();
        if let Some(entry) = self.handles.get_mut(handle) {
            entry.id &= mask;
        }
        handle
    }

    /// log a protocol violation and turn it into the error ending the run
    pub(crate) fn fatal(&self, violation: Violation) -> Error {
        log::error!(target: self.name(), "{}", violation);
        Error::Protocol(violation)
    }

    /// a write keeps the write direction until both its last beat and its
    /// address were taken
    pub(crate) fn is_free_for(&self, command: Command, handle: Option<HandleId>) -> bool {
        let owned_by = |owner: Option<HandleId>| owner.is_none() || owner == handle;
        let write_free = command == Command::Read
            || (owned_by(self.write_burst) && owned_by(self.aw_pending));
        write_free && self.slots.is_free_for(command, handle)
    }

    pub(crate) fn count_request(&mut self, command: Command) {
        self.counters[command.index()] += 1;
    }

    pub(crate) fn claim(&mut self, command: Command, handle: HandleId) -> Result<(), Error> {
        if let Err(violation) = self.slots.claim(command, handle) {
            return Err(self.fatal(violation));
        }
        if command == Command::Write {
            self.write_burst = Some(handle);
        }
        Ok(())
    }

    pub(crate) fn address_issued(&mut self, handle: HandleId) {
        self.aw_pending = Some(handle);
    }

    pub(crate) fn address_taken(&mut self) {
        self.aw_pending = None;
    }

    pub(crate) fn release(&mut self, command: Command) {
        self.slots.release(command);
    }

    /// move an ended request to its response queue
    pub(crate) fn enqueue(&mut self, command: Command, id: u32, handle: HandleId) {
        self.outstanding.push(command, id, handle);
        if command == Command::Write {
            self.write_burst = None;
        }
    }

    /// the request the next response under `id` belongs to
    pub(crate) fn outstanding_head(&self, command: Command, id: u32) -> Result<HandleId, Error> {
        self.outstanding.head(command, id).map_err(|violation| self.fatal(violation))
    }

    /// retire an acknowledged request and destroy its handle
    pub(crate) fn retire(&mut self, command: Command, id: u32, handle: HandleId) -> Result<(), Error> {
        if let Err(violation) = self.outstanding.retire(command, id, handle) {
            return Err(self.fatal(violation));
        }
        let counter = &mut self.counters[command.index()];
        *counter = counter.saturating_sub(1);
        self.handles.remove(handle);
        Ok(())
    }

    pub(crate) fn notify_upstream(&self, handle: HandleId, phase: Phase, delay: Time) -> Result<(), Error> {
        let trans = self.handle(handle)?.trans.clone();
        log::debug!(target: self.name(), "{:?} +{}ps for {}", phase, delay, trans.lock());
        self.upstream.notify_with(Notification { trans, phase, delay })?;
        Ok(())
    }
}

/// pin-level ACE-Lite initiator
pub struct Initiator {
    core: Core,
    table: ReactionTable,
    ingress: Ingress,
    ar: AddressDriver,
    aw: AddressDriver,
    w: WriteDataDriver,
    r: ResponseDriver,
    b: ResponseDriver,
}

impl Initiator {
    /// build an adapter driving `pins`
    ///
    /// the returned listener carries every backward phase; the requester
    /// must keep it alive for as long as the adapter runs
    pub fn new(
        name: &str,
        config: Config,
        pins: &Pins,
    ) -> Result<(Self, Listener<Notification>), Error> {
        config.validate()?;
        pins.check(&config)?;

        let (events, wakes) = events(name);
        let (upstream, backward) = event(&format!("{}.bw", name));
        let lite = config.lite;

        log::info!(
            target: name,
            "{}-bit {} initiator, {}-bit ids",
            config.data_width,
            if lite { "narrow" } else { "ACE-Lite" },
            config.id_width,
        );

        let core = Core {
            name: Ustr::from(name),
            config,
            handles: Handles::default(),
            outstanding: Outstanding::default(),
            slots: ActiveSlots::default(),
            counters: [0; 2],
            write_burst: None,
            aw_pending: None,
            events,
            upstream,
        };

        let initiator = Self {
            core,
            table: reaction_table(),
            ingress: Ingress::default(),
            ar: AddressDriver::new(Command::Read, wakes.ar),
            aw: AddressDriver::new(Command::Write, wakes.aw),
            w: WriteDataDriver::new(wakes.wdata, lite),
            r: ResponseDriver::new(Command::Read, wakes.r_release, lite),
            b: ResponseDriver::new(Command::Write, wakes.b_release, lite),
        };
        Ok((initiator, backward))
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }

    pub fn config(&self) -> &Config {
        self.core.config()
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    /// forward phases accepted and not yet processed
    pub fn pending(&self) -> usize {
        self.ingress.len()
    }

    /// forward path of the requester socket
    pub fn nb_transport_fw(&mut self, trans: &SharedTransaction, phase: Phase) -> SyncStatus {
        self.ingress.accept(&self.core, trans, phase)
    }

    /// blocking transport is not modelled at pin level; the transaction
    /// completes without touching the pins
    pub fn b_transport(&mut self, trans: &SharedTransaction) {
        log::warn!(target: self.name(), "blocking transport does not reach the pins");
        trans.lock().set_status(Status::Ok);
    }

    /// debug transport; no bytes are ever transferred
    pub fn transport_dbg(&mut self, _trans: &SharedTransaction) -> usize {
        0
    }

    /// direct memory access is never granted
    pub fn get_direct_mem_ptr(&mut self, _trans: &SharedTransaction) -> bool {
        false
    }

    /// run the reaction for `point` on a tracked transaction
    pub fn react(
        &mut self,
        point: TimePoint,
        trans: &SharedTransaction,
        pins: &mut Pins,
    ) -> Result<(), Error> {
        let handle = self.core.handles.lookup(trans).ok_or(Error::UnknownTransaction)?;
        self.table.react(point, &mut self.core, pins, handle)
    }

    fn check_clock(&self, clock: &Clock) -> Result<(), Error> {
        let config = self.config();
        if clock.period() != config.clock_period || clock.deskew() != config.deskew {
            return Err(ConfigError::ClockMismatch {
                expected: config.clock_period,
                deskew: config.deskew,
                period: clock.period(),
            }
            .into());
        }
        Ok(())
    }

    fn forward(&mut self, pins: &mut Pins) -> Result<(), Error> {
        for Forward { trans, phase, .. } in self.ingress.take() {
            self.process(&trans, phase, pins)?;
        }
        Ok(())
    }

    fn process(&mut self, trans: &SharedTransaction, phase: Phase, pins: &mut Pins) -> Result<(), Error> {
        let handle = match (phase.is_request(), self.core.handles.lookup(trans)) {
            (_, Some(handle)) => handle,
            (true, None) => {
                let handle = self.core.admit(trans);
                self.table.react(TimePoint::RequestPhaseBegin, &mut self.core, pins, handle)?;
                handle
            }
            (false, None) => {
                log::error!(target: self.name(), "{:?} for untracked transaction {}", phase, trans.lock());
                return Err(Error::UnknownTransaction);
            }
        };

        let core = &mut self.core;
        match phase {
            Phase::BeginPartialReq => self.table.react(TimePoint::BeginPartialRequest, core, pins, handle),
            Phase::BeginReq => self.table.react(TimePoint::BeginRequest, core, pins, handle),
            Phase::EndPartialResp => self.table.react(TimePoint::EndPartialResponse, core, pins, handle),
            Phase::EndResp => {
                self.table.react(TimePoint::EndResponse, core, pins, handle)?;
                if core.config.explicit_ack {
                    return Ok(());
                }
                self.table.react(TimePoint::Acknowledge, core, pins, handle)
            }
            Phase::Ack => self.table.react(TimePoint::Acknowledge, core, pins, handle),
            // backward phases never make it into the queue
            _ => Ok(()),
        }
    }

    fn edge(&mut self, pins: &mut Pins, clock: &Clock) -> Result<(), Error> {
        self.check_clock(clock)?;
        self.ar.on_edge(pins);
        self.aw.on_edge(pins);
        self.w.on_edge(pins);
        self.r.on_edge(pins);
        self.b.on_edge(pins);
        self.forward(pins)
    }

    fn sample_point(&mut self, pins: &mut Pins) -> Result<(), Error> {
        let mut reactor = Reactor { core: &mut self.core, table: &self.table };
        self.ar.on_sample(pins, &mut reactor)?;
        self.aw.on_sample(pins, &mut reactor)?;
        self.w.on_sample(pins, &mut reactor)?;
        self.r.on_sample(pins, &mut reactor)?;
        self.b.on_sample(pins, &mut reactor)
    }

    fn delta(&mut self, pins: &mut Pins) -> bool {
        let mut active = self.ar.on_settle(pins);
        active |= self.aw.on_settle(pins);
        active |= self.w.on_settle(pins);
        active |= self.r.on_settle(pins);
        active |= self.b.on_settle(pins);
        active
    }
}

impl Clocked<Pins> for Initiator {
    fn posedge(&mut self, pins: &mut Pins, clock: &Clock) -> Result<(), sim::Error> {
        self.edge(pins, clock).map_err(sim::Error::clocked)
    }

    fn sample(&mut self, pins: &mut Pins, _clock: &Clock) -> Result<(), sim::Error> {
        self.sample_point(pins).map_err(sim::Error::clocked)
    }

    fn settle(&mut self, pins: &mut Pins, _clock: &Clock) -> Result<bool, sim::Error> {
        Ok(self.delta(pins))
    }
}
