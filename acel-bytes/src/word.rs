//! bus data words and byte strobes
//!
//! lane `i` of a word carries bits `8*i+7 ..= 8*i` of the data bus, so a
//! word is little-endian by construction

use std::fmt;

use smallvec::SmallVec;

use crate::Error;

/// widest supported bus in byte lanes (1024 data bits)
pub const MAX_LANES: usize = 128;

/// one bus-width data word
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Word {
    lanes: SmallVec<[u8; 64]>,
}

impl Word {
    /// an all-zero word spanning `width` byte lanes
    pub fn zeroed(width: usize) -> Self {
        Self { lanes: SmallVec::from_elem(0u8, width) }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self { lanes: SmallVec::from_slice(bytes) }
    }

    /// width of the word in byte lanes
    pub fn width(&self) -> usize {
        self.lanes.len()
    }

    pub fn lanes(&self) -> &[u8] {
        &self.lanes
    }

    pub fn lanes_mut(&mut self) -> &mut [u8] {
        &mut self.lanes
    }

    pub(crate) fn check_width(&self, expected: usize) -> Result<(), Error> {
        if self.width() != expected {
            return Err(Error::WordWidth { got: self.width(), expected });
        }
        Ok(())
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // most significant lane first, like a waveform viewer shows it
        f.write_str("0x")?;
        for lane in self.lanes.iter().rev() {
            write!(f, "{:02x}", lane)?;
        }
        Ok(())
    }
}

/// per-lane write strobe; bit `i` qualifies lane `i`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Strobe(u128);

impl Strobe {
    pub const NONE: Strobe = Strobe(0);

    pub fn bits(&self) -> u128 {
        self.0
    }

    pub fn set(&mut self, lane: usize, enabled: bool) {
        if enabled {
            self.0 |= 1u128 << lane;
        } else {
            self.0 &= !(1u128 << lane);
        }
    }

    pub fn is_set(&self, lane: usize) -> bool {
        self.0 & (1u128 << lane) != 0
    }
}
