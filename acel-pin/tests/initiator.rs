mod common;

use acel_pin::{Command, Config, Error, Phase, Resp, Status, Transaction, Violation};

use common::*;

const PERIOD: u64 = 10_000;

#[test]
fn test_single_read() {
    let (mut sim, mut bench, mut target) = setup(Config::default());
    let t = Transaction::read(0x1000, 8).with_id(1).shared();
    bench.submit(&t);
    target.respond_read(ReadBeat::new(1, bytes(0xa0, 8), true, 1));

    run(&mut sim, &mut bench, &mut target, 10).unwrap();

    assert_eq!(target.reads, vec![Address { addr: 0x1000, id: 1, len: 0, size: 3 }]);
    assert_eq!(bench.phases(&t), vec![Phase::EndReq, Phase::BeginResp]);
    let trans = t.lock();
    assert_eq!(trans.data(), bytes(0xa0, 8).as_slice());
    assert_eq!(trans.status(), Status::Ok);
    assert_eq!(trans.attrs().resp, Resp::Okay);
    drop(trans);

    let core = bench.init.core();
    assert_eq!(core.outstanding(Command::Read), 0);
    assert_eq!(core.queued(Command::Read, 1), 0);
    assert!(core.handles().is_empty());

    // the address is valid for exactly one cycle
    let ar = pulses(sim.tracer(), "top.ar_valid");
    assert_eq!(ar.len(), 1);
    assert_eq!(ar[0].1 - ar[0].0, PERIOD);
}

#[test]
fn test_burst_read() {
    let (mut sim, mut bench, mut target) = setup(Config::default());
    let t = Transaction::read(0x2000, 32).with_id(3).with_shape(4, 8).shared();
    bench.submit(&t);
    for beat in 0..4u8 {
        let mut rb = ReadBeat::new(3, bytes(beat * 8, 8), beat == 3, 1);
        if beat == 3 {
            rb.resp = 2;
        }
        target.respond_read(rb);
    }

    run(&mut sim, &mut bench, &mut target, 30).unwrap();

    assert!(target.idle());
    assert_eq!(target.reads, vec![Address { addr: 0x2000, id: 3, len: 3, size: 3 }]);
    assert_eq!(
        bench.phases(&t),
        vec![
            Phase::EndReq,
            Phase::BeginPartialResp,
            Phase::BeginPartialResp,
            Phase::BeginPartialResp,
            Phase::BeginResp,
        ]
    );
    let trans = t.lock();
    assert_eq!(trans.data(), bytes(0, 32).as_slice());
    assert_eq!(trans.attrs().responses, vec![Resp::Okay, Resp::Okay, Resp::Okay, Resp::SlvErr]);
    assert_eq!(trans.attrs().resp, Resp::SlvErr);
    drop(trans);

    // one single-cycle ready pulse per beat
    let ready = pulses(sim.tracer(), "top.r_ready");
    assert_eq!(ready.len(), 4);
    assert!(ready.iter().all(|(rise, fall)| fall - rise == PERIOD));
    assert!(bench.init.core().handles().is_empty());
}

#[test]
fn test_unaligned_write_burst() {
    let (mut sim, mut bench, mut target) = setup(Config::default());
    let data = bytes(0x10, 12);
    let mut enable = vec![true; 12];
    enable[5] = false;
    let t = Transaction::write(0x3004, data.clone())
        .with_id(2)
        .with_shape(2, 8)
        .with_byte_enable(enable)
        .shared();
    bench.submit(&t);
    target.respond_write(WriteResp { id: 2, resp: 0, after: 2 });

    run(&mut sim, &mut bench, &mut target, 12).unwrap();

    assert_eq!(target.writes, vec![Address { addr: 0x3004, id: 2, len: 1, size: 3 }]);
    assert_eq!(target.beats.len(), 2);

    let first = &target.beats[0];
    assert_eq!(&first.data.lanes()[4..8], &data[0..4]);
    assert_eq!(first.strb.bits(), 0xf0);
    assert!(!first.last);

    let second = &target.beats[1];
    assert_eq!(second.data.lanes(), &data[4..12]);
    assert_eq!(second.strb.bits(), 0xfd);
    assert!(second.last);

    assert_eq!(bench.phases(&t), vec![Phase::EndPartialReq, Phase::EndReq, Phase::BeginResp]);
    assert!(bench.is_done(&t));
    assert_eq!(bench.init.core().outstanding(Command::Write), 0);
    assert_eq!(bench.init.core().write_burst(), None);

    let ready = pulses(sim.tracer(), "top.b_ready");
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].1 - ready[0].0, PERIOD);
}

#[test]
fn test_narrow_write() {
    let (mut sim, mut bench, mut target) = setup(Config::lite(32));
    let t = Transaction::write(0x1001, vec![1, 2, 3]).shared();
    bench.submit(&t);
    target.respond_write(WriteResp { id: 0, resp: 0, after: 1 });

    run(&mut sim, &mut bench, &mut target, 10).unwrap();

    assert_eq!(target.writes.len(), 1);
    assert_eq!(target.writes[0].addr, 0x1001);
    assert_eq!(target.beats.len(), 1);
    assert_eq!(&target.beats[0].data.lanes()[1..4], &[1, 2, 3]);
    assert_eq!(target.beats[0].strb.bits(), 0b1110);
    assert_eq!(bench.phases(&t), vec![Phase::EndReq, Phase::BeginResp]);
    assert!(bench.init.core().handles().is_empty());
}

#[test]
fn test_narrow_overrun_stops_the_run() {
    let (mut sim, mut bench, mut target) = setup(Config::lite(32));
    let t = Transaction::read(0x2, 4).shared();
    bench.submit(&t);

    let err = run(&mut sim, &mut bench, &mut target, 5).unwrap_err();
    let violation = Error::from_sim(&err).and_then(Error::violation);
    assert!(matches!(violation, Some(Violation::NarrowOverrun(_, 4))));
    assert!(target.reads.is_empty());
}

#[test]
fn test_response_without_request_stops_the_run() {
    let (mut sim, mut bench, mut target) = setup(Config::default());
    target.respond_read(ReadBeat::new(0, vec![0; 8], true, 0));

    let err = run(&mut sim, &mut bench, &mut target, 5).unwrap_err();
    let violation = Error::from_sim(&err).and_then(Error::violation);
    assert_eq!(violation, Some(&Violation::EmptyResponseQueue(Command::Read, 0)));
}

#[test]
fn test_distinct_ids_complete_out_of_order() {
    let (mut sim, mut bench, mut target) = setup(Config::default());
    let a = Transaction::read(0x100, 8).with_id(1).shared();
    let b = Transaction::read(0x200, 8).with_id(2).shared();
    bench.submit(&a);
    bench.submit(&b);
    target.respond_read(ReadBeat::new(2, bytes(0xb0, 8), true, 2));
    target.respond_read(ReadBeat::new(1, bytes(0xa0, 8), true, 2));

    run(&mut sim, &mut bench, &mut target, 20).unwrap();

    assert_eq!(target.reads.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(bench.done.len(), 2);
    assert!(std::sync::Arc::ptr_eq(&bench.done[0], &b));
    assert!(std::sync::Arc::ptr_eq(&bench.done[1], &a));
    assert_eq!(a.lock().data(), bytes(0xa0, 8).as_slice());
    assert_eq!(b.lock().data(), bytes(0xb0, 8).as_slice());
}

#[test]
fn test_interleaved_bursts_keep_per_id_beat_order() {
    let (mut sim, mut bench, mut target) = setup(Config::default());
    let a = Transaction::read(0x100, 16).with_id(1).with_shape(2, 8).shared();
    let b = Transaction::read(0x200, 16).with_id(2).with_shape(2, 8).shared();
    bench.submit(&a);
    bench.submit(&b);
    target.respond_read(ReadBeat::new(2, bytes(0xc0, 8), false, 2));
    target.respond_read(ReadBeat::new(1, bytes(0xa0, 8), false, 2));
    target.respond_read(ReadBeat::new(2, bytes(0xc8, 8), true, 2));
    target.respond_read(ReadBeat::new(1, bytes(0xa8, 8), true, 2));

    run(&mut sim, &mut bench, &mut target, 30).unwrap();

    assert!(target.idle());
    assert_eq!(a.lock().data(), bytes(0xa0, 16).as_slice());
    assert_eq!(b.lock().data(), bytes(0xc0, 16).as_slice());
    let expected = vec![Phase::EndReq, Phase::BeginPartialResp, Phase::BeginResp];
    assert_eq!(bench.phases(&a), expected);
    assert_eq!(bench.phases(&b), expected);
    assert!(std::sync::Arc::ptr_eq(&bench.done[0], &b));
    assert!(std::sync::Arc::ptr_eq(&bench.done[1], &a));
    assert!(bench.init.core().handles().is_empty());
}

#[test]
fn test_write_response_without_request_stops_the_run() {
    let (mut sim, mut bench, mut target) = setup(Config::default());
    target.respond_write(WriteResp { id: 3, resp: 0, after: 0 });

    let err = run(&mut sim, &mut bench, &mut target, 5).unwrap_err();
    let violation = Error::from_sim(&err).and_then(Error::violation);
    assert_eq!(violation, Some(&Violation::EmptyResponseQueue(Command::Write, 3)));
}

#[test]
fn test_write_address_held_until_handshake() {
    let (mut sim, mut bench, mut target) = setup(Config::default());
    target.aw_stall = 8;
    let a = Transaction::write(0x100, bytes(0xa0, 8)).shared();
    let b = Transaction::write(0x200, bytes(0xb0, 8)).shared();
    bench.submit(&a);
    bench.submit(&b);
    target.respond_write(WriteResp { id: 0, resp: 0, after: 1 });
    target.respond_write(WriteResp { id: 0, resp: 0, after: 2 });

    run(&mut sim, &mut bench, &mut target, 30).unwrap();

    assert_eq!(target.writes.iter().map(|w| w.addr).collect::<Vec<_>>(), vec![0x100, 0x200]);
    assert_eq!(target.beats.len(), 2);
    assert_eq!(target.beats[0].data.lanes(), bytes(0xa0, 8).as_slice());
    assert_eq!(target.beats[1].data.lanes(), bytes(0xb0, 8).as_slice());
    assert!(bench.is_done(&a));
    assert!(bench.is_done(&b));
    assert_eq!(bench.init.core().address_pending(), None);
    assert!(bench.init.core().handles().is_empty());
}

#[test]
fn test_explicit_acknowledge() {
    let config = Config { explicit_ack: true, ..Config::default() };
    let (mut sim, mut bench, mut target) = setup(config);
    bench.auto_ack = false;
    let a = Transaction::read(0x0, 8).with_id(1).shared();
    let c = Transaction::read(0x8, 8).with_id(1).shared();
    bench.submit(&a);
    bench.submit(&c);
    target.respond_read(ReadBeat::new(1, bytes(0xa0, 8), true, 1));
    target.respond_read(ReadBeat::new(1, bytes(0xc0, 8), true, 2));

    run(&mut sim, &mut bench, &mut target, 10).unwrap();
    assert!(bench.is_done(&a));
    assert!(!bench.is_done(&c));
    // the response channel is held until the acknowledge
    assert!(pulses(sim.tracer(), "top.r_ready").is_empty());
    assert_eq!(bench.init.core().queued(Command::Read, 1), 2);

    bench.send(&a, Phase::Ack);
    run(&mut sim, &mut bench, &mut target, 10).unwrap();
    assert!(bench.is_done(&c));
    assert_eq!(bench.init.core().outstanding(Command::Read), 1);

    bench.send(&c, Phase::Ack);
    run(&mut sim, &mut bench, &mut target, 2).unwrap();
    assert_eq!(bench.init.core().outstanding(Command::Read), 0);
    assert!(bench.init.core().handles().is_empty());
    assert_eq!(c.lock().data(), bytes(0xc0, 8).as_slice());
}

#[test]
fn test_acknowledge_out_of_order_stops_the_run() {
    let config = Config { explicit_ack: true, ..Config::default() };
    let (mut sim, mut bench, mut target) = setup(config);
    bench.auto_ack = false;
    let a = Transaction::read(0x0, 8).with_id(1).shared();
    let c = Transaction::read(0x8, 8).with_id(1).shared();
    bench.submit(&a);
    bench.submit(&c);
    target.respond_read(ReadBeat::new(1, bytes(0xa0, 8), true, 2));

    run(&mut sim, &mut bench, &mut target, 10).unwrap();
    assert!(bench.is_done(&a));

    bench.send(&c, Phase::Ack);
    let err = run(&mut sim, &mut bench, &mut target, 1).unwrap_err();
    let violation = Error::from_sim(&err).and_then(Error::violation);
    assert_eq!(violation, Some(&Violation::AckOrder(Command::Read, 1)));
}

#[test]
fn test_acknowledge_without_response_stops_the_run() {
    let config = Config { explicit_ack: true, ..Config::default() };
    let (mut sim, mut bench, mut target) = setup(config);
    target.stall = true;
    let t = Transaction::read(0x0, 8).with_id(1).shared();
    bench.submit(&t);

    run(&mut sim, &mut bench, &mut target, 3).unwrap();
    assert_eq!(bench.init.core().queued(Command::Read, 1), 0);

    bench.send(&t, Phase::Ack);
    let err = run(&mut sim, &mut bench, &mut target, 1).unwrap_err();
    let violation = Error::from_sim(&err).and_then(Error::violation);
    assert_eq!(violation, Some(&Violation::EmptyAckQueue(Command::Read, 1)));
}

#[test]
fn test_stalled_target_holds_the_request() {
    let (mut sim, mut bench, mut target) = setup(Config::default());
    target.stall = true;
    let a = Transaction::read(0x40, 8).shared();
    let b = Transaction::read(0x80, 8).shared();
    bench.submit(&a);
    bench.submit(&b);

    run(&mut sim, &mut bench, &mut target, 20).unwrap();
    assert!(target.reads.is_empty());
    assert!(sim.wires().ar.valid.is_high());
    assert!(bench.phases(&a).is_empty());
    assert_eq!(bench.init.core().outstanding(Command::Read), 1);
    assert_eq!(bench.init.pending(), 0);

    target.stall = false;
    run(&mut sim, &mut bench, &mut target, 5).unwrap();
    assert_eq!(target.reads.iter().map(|a| a.addr).collect::<Vec<_>>(), vec![0x40, 0x80]);
    assert_eq!(bench.phases(&b), vec![Phase::EndReq]);
    assert_eq!(bench.init.core().queued(Command::Read, 0), 2);
}

#[test]
fn test_stash_hints() {
    let config = Config { stash: true, snoop_width: 4, ..Config::default() };
    let (mut sim, mut bench, mut target) = setup(config);
    let t = Transaction::write(0x500, bytes(0, 8))
        .with_attrs(|attrs| {
            attrs.stash_nid = Some(0x12);
            attrs.snoop = 0b1100;
        })
        .shared();
    bench.submit(&t);
    target.respond_write(WriteResp { id: 0, resp: 0, after: 1 });

    run(&mut sim, &mut bench, &mut target, 10).unwrap();

    let aw = &sim.wires().aw;
    let stash = aw.stash.as_ref().unwrap();
    assert!(stash.nid_en.get());
    assert_eq!(stash.nid.get(), 0x12);
    assert!(!stash.lpid_en.get());
    assert_eq!(aw.snoop.as_ref().unwrap().get(), 0b1100);
    assert!(bench.is_done(&t));
}
