//! two-phase signals
//!
//! writes are held pending until the scheduler calls `update`, so every
//! reader in a delta step observes the value committed by the previous one

use ustr::Ustr;

use acel_bytes::{Strobe, Word};

/// a value that can be handed to a trace recorder
pub trait Traced: Clone + PartialEq {
    /// append the value as little-endian bytes
    fn trace_bytes(&self, out: &mut Vec<u8>);
}

impl Traced for bool {
    fn trace_bytes(&self, out: &mut Vec<u8>) {
        out.push(*self as u8)
    }
}

macro_rules! impl_traced {
    [$($t:ty),*] => {
        $(
            impl Traced for $t {
                fn trace_bytes(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes())
                }
            }
        )*
    };
}

impl_traced![u8, u16, u32, u64];

impl Traced for Word {
    fn trace_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.lanes())
    }
}

impl Traced for Strobe {
    fn trace_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.bits().to_le_bytes())
    }
}

/// type-erased view of a signal for the scheduler and trace recorders
pub trait Probe {
    fn name(&self) -> Ustr;
    fn width(&self) -> u32;
    /// commit the pending write; true if the committed value changed
    fn update(&mut self) -> bool;
    fn trace_bytes(&self, out: &mut Vec<u8>);
}

#[derive(Debug, Clone)]
pub struct Signal<T> {
    name: Ustr,
    width: u32,
    current: T,
    pending: Option<T>,
    changed: bool,
}

impl<T: Traced> Signal<T> {
    pub fn new(name: &str, width: u32, init: T) -> Self {
        Self {
            name: Ustr::from(name),
            width,
            current: init,
            pending: None,
            changed: false,
        }
    }

    pub fn name(&self) -> Ustr {
        self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// committed value
    pub fn read(&self) -> &T {
        &self.current
    }

    /// schedule `value`; the last write before an update wins
    pub fn write(&mut self, value: T) {
        self.pending = Some(value)
    }

    /// true if the most recent update changed the committed value
    pub fn event(&self) -> bool {
        self.changed
    }
}

impl<T: Traced + Copy> Signal<T> {
    pub fn get(&self) -> T {
        self.current
    }
}

impl Signal<bool> {
    pub fn is_high(&self) -> bool {
        self.current
    }

    /// true if the most recent update raised the signal
    pub fn posedge(&self) -> bool {
        self.changed && self.current
    }
}

impl<T: Traced> Probe for Signal<T> {
    fn name(&self) -> Ustr {
        self.name
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn update(&mut self) -> bool {
        self.changed = match self.pending.take() {
            Some(value) if value != self.current => {
                self.current = value;
                true
            }
            _ => false,
        };
        self.changed
    }

    fn trace_bytes(&self, out: &mut Vec<u8>) {
        self.current.trace_bytes(out)
    }
}
