//! trace recording
//!
//! a tracer is told about every traced signal once, at start-up, and is
//! then handed the committed value of each signal after every time point

use ahash::AHashMap as Map;
use ustr::Ustr;

use crate::Time;

pub trait Tracer {
    /// register a signal for tracing
    fn register(&mut self, name: Ustr, width: u32);

    /// record the current value of a registered signal
    fn record(&mut self, time: Time, name: Ustr, value: &[u8]);
}

/// a tracer that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl Tracer for NoTrace {
    fn register(&mut self, _name: Ustr, _width: u32) {}

    fn record(&mut self, _time: Time, _name: Ustr, _value: &[u8]) {}
}

/// a single value change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub time: Time,
    pub name: Ustr,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone)]
struct Entry {
    width: u32,
    last: Option<Vec<u8>>,
}

/// an in-memory value-change recorder
///
/// only records a value when it differs from the previously recorded one
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    signals: Map<Ustr, Entry>,
    log: Vec<Change>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// width of a registered signal
    pub fn width(&self, name: &str) -> Option<u32> {
        self.signals.get(&Ustr::from(name)).map(|entry| entry.width)
    }

    /// get a slice of the current log
    pub fn log(&self) -> &[Change] {
        &self.log
    }

    /// all changes of one signal, oldest first
    pub fn history(&self, name: &str) -> Vec<(Time, &[u8])> {
        let name = Ustr::from(name);
        self.log
            .iter()
            .filter(|change| change.name == name)
            .map(|change| (change.time, change.value.as_slice()))
            .collect()
    }

    /// value of a signal as of `time`
    pub fn value_at(&self, name: &str, time: Time) -> Option<&[u8]> {
        let name = Ustr::from(name);
        self.log
            .iter()
            .take_while(|change| change.time <= time)
            .filter(|change| change.name == name)
            .last()
            .map(|change| change.value.as_slice())
    }

    /// display the log, one change per line
    pub fn display(&self) -> String {
        let mut out = String::new();
        for change in self.log.iter() {
            out = format!("{out}\n{:>10} {} {:02x?}", change.time, change.name, change.value);
        }
        out
    }
}

impl Tracer for TraceLog {
    fn register(&mut self, name: Ustr, width: u32) {
        self.signals.insert(name, Entry { width, last: None });
    }

    fn record(&mut self, time: Time, name: Ustr, value: &[u8]) {
        let Some(entry) = self.signals.get_mut(&name) else {
            log::warn!(target: "acel::trace", "record of unregistered signal `{}`", name);
            return;
        };
        if entry.last.as_deref() == Some(value) {
            return;
        }
        entry.last = Some(value.to_vec());
        self.log.push(Change { time, name, value: value.to_vec() });
    }
}
