//! phase reactions
//!
//! one reaction per time point of the phase machine. reactions never wait:
//! they update bookkeeping, drive payload signals and hand anything that
//! has to wait for the peer to a channel driver through its event.

use acel_bytes::{pack_beat, BeatLayout};

use crate::bookkeeping::HandleId;
use crate::error::{Error, Violation};
use crate::phase::{Phase, ReactionTable, TimePoint};
use crate::pins::{drive, AddrPins, Pins};
use crate::protocol::{Command, Status, Transaction};
use crate::Core;

/// the adapter's reaction table
pub fn reaction_table() -> ReactionTable {
    let mut table = ReactionTable::new();
    table
        .set(TimePoint::RequestPhaseBegin, request_phase_begin)
        .set(TimePoint::BeginPartialRequest, begin_partial_request)
        .set(TimePoint::EndPartialRequest, end_partial_request)
        .set(TimePoint::BeginRequest, begin_request)
        .set(TimePoint::EndRequest, end_request)
        .set(TimePoint::BeginPartialResponse, begin_partial_response)
        .set(TimePoint::EndPartialResponse, end_partial_response)
        .set(TimePoint::BeginResponse, begin_response)
        .set(TimePoint::EndResponse, end_response)
        .set(TimePoint::Acknowledge, acknowledge);
    table
}

/// what the write-data driver should put on the channel next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteBeat {
    pub last: bool,
}

fn request_phase_begin(core: &mut Core, _pins: &mut Pins, h: HandleId) -> Result<(), Error> {
    let bus = core.bus_bytes();
    let lite = core.config().lite;

    let handle = core.handle_mut(h)?;
    if handle.is_snoop {
        log::trace!(target: core.name(), "snoop {:?} skips request bookkeeping", h);
        return Ok(());
    }
    handle.beat_count = 0;
    let command = handle.command;
    let (overrun, shape) = {
        let trans = handle.trans.lock();
        let offset = (trans.address() % bus as u64) as usize;
        let overrun = (lite && offset + trans.data().len() > bus).then(|| trans.to_string());
        let layout = BeatLayout::new(trans.address(), trans.beat_bytes(), bus, trans.data().len());
        (overrun, layout.map(|layout| (trans.beats(), layout.beats())))
    };

    core.count_request(command);
    if let Some(trans) = overrun {
        return Err(core.fatal(Violation::NarrowOverrun(trans, bus)));
    }
    // the burst length field cannot say more than 256 beats
    let (beats, needed) = shape?;
    if needed > beats {
        log::error!(target: core.name(), "{:?} needs {} beats, burst has {}", h, needed, beats);
        return Err(Error::BurstShape { beats, needed });
    }
    Ok(())
}

fn begin_partial_request(core: &mut Core, pins: &mut Pins, h: HandleId) -> Result<(), Error> {
    let command = core.handle(h)?.command;
    if command != Command::Write {
        return Err(Error::UnexpectedPhase(TimePoint::BeginPartialRequest, command));
    }
    start_write_beat(core, pins, h, false)
}

fn end_partial_request(core: &mut Core, _pins: &mut Pins, h: HandleId) -> Result<(), Error> {
    core.release(Command::Write);
    core.notify_upstream(h, Phase::EndPartialReq, core.request_delay())?;
    core.handle_mut(h)?.beat_count += 1;
    Ok(())
}

fn begin_request(core: &mut Core, pins: &mut Pins, h: HandleId) -> Result<(), Error> {
    match core.handle(h)?.command {
        Command::Read => {
            core.claim(Command::Read, h)?;
            let mask = core.addr_mask();
            let handle = core.handle(h)?;
            drive_address(&mut pins.ar, &handle.trans.lock(), handle.id, mask);
            core.events().ar.notify()?;
            Ok(())
        }
        Command::Write => start_write_beat(core, pins, h, true),
    }
}

fn end_request(core: &mut Core, _pins: &mut Pins, h: HandleId) -> Result<(), Error> {
    let (command, id) = {
        let handle = core.handle(h)?;
        (handle.command, handle.id)
    };
    core.enqueue(command, id, h);
    core.release(command);
    if command == Command::Write {
        core.handle_mut(h)?.beat_count += 1;
    }
    core.notify_upstream(h, Phase::EndReq, core.request_delay())?;
    core.handle(h)?.trans.lock().set_status(Status::Ok);
    Ok(())
}

fn begin_partial_response(core: &mut Core, _pins: &mut Pins, h: HandleId) -> Result<(), Error> {
    let command = core.handle(h)?.command;
    if command != Command::Read {
        return Err(Error::UnexpectedPhase(TimePoint::BeginPartialResponse, command));
    }
    core.notify_upstream(h, Phase::BeginPartialResp, 0)
}

fn end_partial_response(core: &mut Core, _pins: &mut Pins, h: HandleId) -> Result<(), Error> {
    core.handle_mut(h)?.beat_count += 1;
    core.events().r_release.notify()?;
    Ok(())
}

fn begin_response(core: &mut Core, _pins: &mut Pins, h: HandleId) -> Result<(), Error> {
    core.notify_upstream(h, Phase::BeginResp, 0)
}

fn end_response(core: &mut Core, _pins: &mut Pins, h: HandleId) -> Result<(), Error> {
    log::trace!(target: core.name(), "end of response for {:?}, acknowledge is next", h);
    Ok(())
}

fn acknowledge(core: &mut Core, _pins: &mut Pins, h: HandleId) -> Result<(), Error> {
    let (command, id) = {
        let handle = core.handle(h)?;
        (handle.command, handle.id)
    };
    match command {
        Command::Read => core.events().r_release.notify()?,
        Command::Write => core.events().b_release.notify()?,
    }
    core.retire(command, id, h)
}

/// put the next beat of a write on the write-data channel, opening the
/// address phase with the first one
fn start_write_beat(core: &mut Core, pins: &mut Pins, h: HandleId, last: bool) -> Result<(), Error> {
    core.claim(Command::Write, h)?;

    let first = core.handle(h)?.beat_count == 0;
    if first {
        core.address_issued(h);
    }

    let bus = core.bus_bytes();
    let mask = core.addr_mask();
    let handle = core.handle(h)?;
    let trans = handle.trans.lock();
    if first {
        drive_address(&mut pins.aw, &trans, handle.id, mask);
        drive_stash(&mut pins.aw, &trans, core.name());
        core.events().aw.notify()?;
    }

    let layout = BeatLayout::new(trans.address(), trans.beat_bytes(), bus, trans.data().len())?;
    let (word, strobe) = pack_beat(&layout, handle.beat_count, trans.data(), trans.byte_enable())?;
    pins.w.data.write(word);
    pins.w.strb.write(strobe);
    drive(&mut pins.w.user, trans.attrs().data_user);

    core.events().wdata.notify_with(WriteBeat { last })?;
    Ok(())
}

fn drive_address(ch: &mut AddrPins, trans: &Transaction, id: u32, mask: u64) {
    let attrs = trans.attrs();
    ch.addr.write(trans.address() & mask);
    ch.prot.write(attrs.prot.into_bits());
    drive(&mut ch.id, id);
    drive(&mut ch.len, attrs.length);
    drive(&mut ch.size, attrs.size);
    drive(&mut ch.burst, attrs.burst as u8);
    drive(&mut ch.cache, attrs.cache.into_bits());
    drive(&mut ch.qos, attrs.qos);
    drive(&mut ch.region, attrs.region);
    drive(&mut ch.user, attrs.user);
    drive(&mut ch.domain, attrs.domain as u8);
    drive(&mut ch.snoop, attrs.snoop);
    drive(&mut ch.bar, attrs.barrier as u8);
}

fn drive_stash(ch: &mut AddrPins, trans: &Transaction, target: &str) {
    let attrs = trans.attrs();
    let Some(stash) = ch.stash.as_mut() else {
        if attrs.stash_nid.is_some() || attrs.stash_lpid.is_some() {
            log::debug!(target: target, "no stash signals, dropping stash hints of {}", trans);
        }
        return;
    };
    stash.nid_en.write(attrs.stash_nid.is_some());
    if let Some(nid) = attrs.stash_nid {
        stash.nid.write(nid & 0x7ff);
    }
    stash.lpid_en.write(attrs.stash_lpid.is_some());
    if let Some(lpid) = attrs.stash_lpid {
        stash.lpid.write(lpid & 0x1f);
    }
}
