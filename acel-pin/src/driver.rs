//! channel drivers
//!
//! one driver per ACE-Lite channel. a driver is a small state machine
//! stepped by the adapter: woken through its event in `settle`, checked
//! against the peer at the sample point and retired on the next rising
//! edge. every handshake completes at the sample point of the cycle the
//! driving side asserted its half, and the asserted signal drops on the
//! following edge unless the next transfer raises it again.

use acel_bytes::{unpack_beat, BeatLayout};
use acel_sim::{Listener, Signal};

use crate::bookkeeping::HandleId;
use crate::callbacks::WriteBeat;
use crate::error::Error;
use crate::phase::{ReactionTable, TimePoint};
use crate::pins::{AddrPins, Pins};
use crate::protocol::{AceAttrs, Command, Resp};
use crate::Core;

/// the core together with the table its reactions come from
pub(crate) struct Reactor<'a> {
    pub core: &'a mut Core,
    pub table: &'a ReactionTable,
}

impl Reactor<'_> {
    fn react(&mut self, point: TimePoint, pins: &mut Pins, handle: HandleId) -> Result<(), Error> {
        self.table.react(point, self.core, pins, handle)
    }

    fn active(&self, command: Command) -> Result<HandleId, Error> {
        self.core.active(command).ok_or(Error::NoActiveRequest(command))
    }
}

/// state of a driver owning `valid`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Idle,
    WaitReady,
    WaitEdge,
}

/// state of a driver owning `ready`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Response {
    Listen,
    WaitRelease,
    WaitEdge,
}

/// AR and AW
pub(crate) struct AddressDriver {
    command: Command,
    wake: Listener,
    state: Request,
}

impl AddressDriver {
    pub fn new(command: Command, wake: Listener) -> Self {
        Self { command, wake, state: Request::Idle }
    }

    fn channel<'p>(&self, pins: &'p mut Pins) -> &'p mut AddrPins {
        match self.command {
            Command::Read => &mut pins.ar,
            Command::Write => &mut pins.aw,
        }
    }

    pub fn on_edge(&mut self, pins: &mut Pins) {
        if self.state == Request::WaitEdge {
            self.channel(pins).valid.write(false);
            self.state = Request::Idle;
        }
    }

    pub fn on_settle(&mut self, pins: &mut Pins) -> bool {
        if self.state != Request::Idle || self.wake.poll().is_none() {
            return false;
        }
        self.channel(pins).valid.write(true);
        self.state = Request::WaitReady;
        true
    }

    pub fn on_sample(&mut self, pins: &mut Pins, reactor: &mut Reactor<'_>) -> Result<(), Error> {
        if self.state != Request::WaitReady || !self.channel(pins).ready.is_high() {
            return Ok(());
        }
        self.state = Request::WaitEdge;
        // a write request ends with its last data beat, not its address
        match self.command {
            Command::Read => {
                let handle = reactor.active(Command::Read)?;
                reactor.react(TimePoint::EndRequest, pins, handle)?;
            }
            Command::Write => reactor.core.address_taken(),
        }
        Ok(())
    }
}

/// W
pub(crate) struct WriteDataDriver {
    wake: Listener<WriteBeat>,
    state: Request,
    last: bool,
    lite: bool,
}

impl WriteDataDriver {
    pub fn new(wake: Listener<WriteBeat>, lite: bool) -> Self {
        Self { wake, state: Request::Idle, last: false, lite }
    }

    pub fn on_edge(&mut self, pins: &mut Pins) {
        if self.state == Request::WaitEdge {
            pins.w.valid.write(false);
            if let Some(last) = pins.w.last.as_mut() {
                last.write(false);
            }
            self.state = Request::Idle;
        }
    }

    pub fn on_settle(&mut self, pins: &mut Pins) -> bool {
        if self.state != Request::Idle {
            return false;
        }
        let Some(beat) = self.wake.poll() else {
            return false;
        };
        pins.w.valid.write(true);
        if let Some(last) = pins.w.last.as_mut() {
            last.write(beat.last);
        }
        self.last = beat.last;
        self.state = Request::WaitReady;
        true
    }

    pub fn on_sample(&mut self, pins: &mut Pins, reactor: &mut Reactor<'_>) -> Result<(), Error> {
        if self.state != Request::WaitReady || !pins.w.ready.is_high() {
            return Ok(());
        }
        self.state = Request::WaitEdge;
        let handle = reactor.active(Command::Write)?;
        let point = if self.last || self.lite {
            TimePoint::EndRequest
        } else {
            TimePoint::EndPartialRequest
        };
        reactor.react(point, pins, handle)
    }
}

/// R and B
pub(crate) struct ResponseDriver {
    command: Command,
    release: Listener,
    state: Response,
    lite: bool,
}

impl ResponseDriver {
    pub fn new(command: Command, release: Listener, lite: bool) -> Self {
        Self { command, release, state: Response::Listen, lite }
    }

    fn ready<'p>(&self, pins: &'p mut Pins) -> &'p mut Signal<bool> {
        match self.command {
            Command::Read => &mut pins.r.ready,
            Command::Write => &mut pins.b.ready,
        }
    }

    pub fn on_edge(&mut self, pins: &mut Pins) {
        if self.state == Response::WaitEdge {
            self.ready(pins).write(false);
            self.state = Response::Listen;
        }
    }

    pub fn on_settle(&mut self, pins: &mut Pins) -> bool {
        if self.state != Response::WaitRelease || self.release.poll().is_none() {
            return false;
        }
        self.ready(pins).write(true);
        self.state = Response::WaitEdge;
        true
    }

    pub fn on_sample(&mut self, pins: &mut Pins, reactor: &mut Reactor<'_>) -> Result<(), Error> {
        let valid = match self.command {
            Command::Read => pins.r.valid.is_high(),
            Command::Write => pins.b.valid.is_high(),
        };
        if self.state != Response::Listen || !valid {
            return Ok(());
        }
        let handle = reactor.core.outstanding_head(self.command, self.response_id(pins))?;
        let point = match self.command {
            Command::Read => self.read_beat(pins, reactor.core, handle)?,
            Command::Write => write_response(pins, reactor.core, handle)?,
        };
        self.state = Response::WaitRelease;
        reactor.react(point, pins, handle)
    }

    fn response_id(&self, pins: &Pins) -> u32 {
        let id = match self.command {
            Command::Read => pins.r.id.as_ref(),
            Command::Write => pins.b.id.as_ref(),
        };
        id.map_or(0, |sig| sig.get())
    }

    fn read_beat(&self, pins: &Pins, core: &Core, handle: HandleId) -> Result<TimePoint, Error> {
        let resp = Resp::from_bits(pins.r.resp.get());
        let last = self.lite || pins.r.last.as_ref().map_or(false, |sig| sig.get());

        let handle = core.handle(handle)?;
        let mut trans = handle.trans.lock();
        let layout =
            BeatLayout::new(trans.address(), trans.beat_bytes(), core.bus_bytes(), trans.data().len())?;
        unpack_beat(&layout, handle.beat_count, pins.r.data.read(), trans.data_mut())?;
        record_response(trans.attrs_mut(), resp);

        Ok(if last { TimePoint::BeginResponse } else { TimePoint::BeginPartialResponse })
    }
}

fn write_response(pins: &Pins, core: &Core, handle: HandleId) -> Result<TimePoint, Error> {
    let resp = Resp::from_bits(pins.b.resp.get());
    record_response(core.handle(handle)?.trans.lock().attrs_mut(), resp);
    Ok(TimePoint::BeginResponse)
}

fn record_response(attrs: &mut AceAttrs, resp: Resp) {
    attrs.resp = resp;
    attrs.responses.push(resp);
}
