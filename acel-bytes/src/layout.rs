//! beat layout arithmetic
//!
//! maps each beat of a burst onto a window of the linear transfer buffer
//! and a run of byte lanes on the data bus.
//!
//! beat `k` nominally starts at buffer offset `k * size` and lands on lane
//! `(base + k * size) mod width`. a beat that would run past the top lane is
//! cut at the bus boundary; every later beat then restarts at lane-aligned
//! buffer offset `byte_offset - lane_offset`. for an unaligned burst whose
//! beats span the whole bus this is the first beat only, which carries
//! `width - lane_offset` bytes.

use std::ops::Range;

use crate::{Error, MAX_LANES};

/// placement of one beat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// first buffer index carried by the beat
    pub start: usize,
    /// first byte lane the beat occupies
    pub lane: usize,
    /// number of bytes (and lanes) carried
    pub count: usize,
}

impl Window {
    pub fn bytes(&self) -> Range<usize> {
        self.start..self.start + self.count
    }

    pub fn lanes(&self) -> Range<usize> {
        self.lane..self.lane + self.count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatLayout {
    base: u64,
    size: usize,
    width: usize,
    len: usize,
}

impl BeatLayout {
    /// layout of a `len`-byte transfer at `base` moved in beats of `size`
    /// bytes over a `width`-byte bus
    pub fn new(base: u64, size: usize, width: usize, len: usize) -> Result<Self, Error> {
        if !width.is_power_of_two() || width > MAX_LANES {
            return Err(Error::BusWidth(width));
        }
        if !size.is_power_of_two() || size > width {
            return Err(Error::BeatSize { size, width });
        }
        Ok(Self { base, size, width, len })
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// lane offset of the base address
    pub fn base_lane(&self) -> usize {
        (self.base % self.width as u64) as usize
    }

    /// nominal lane offset of `beat`: `(base + beat * size) mod width`
    pub fn lane_offset(&self, beat: usize) -> usize {
        let byte_offset = (beat * self.size) as u64;
        (self.base.wrapping_add(byte_offset) % self.width as u64) as usize
    }

    /// index of the beat cut at the bus boundary, if any beat is
    fn cut_beat(&self) -> Option<usize> {
        let lane0 = self.base_lane();
        if lane0 % self.size == 0 {
            None
        } else {
            Some((self.width - lane0) / self.size)
        }
    }

    /// placement of `beat`, bounded by the transfer length
    pub fn window(&self, beat: usize) -> Result<Window, Error> {
        let lane0 = self.base_lane();
        let (start, lane, count) = match self.cut_beat() {
            Some(cut) if beat == cut => {
                let lane = lane0 + cut * self.size;
                (cut * self.size, lane, self.width - lane)
            }
            Some(cut) if beat > cut => {
                let start = self.width - lane0 + (beat - cut - 1) * self.size;
                (start, self.lane_of(start), self.size)
            }
            _ => (beat * self.size, self.lane_offset(beat), self.size),
        };
        if start >= self.len {
            return Err(Error::BeatOutOfRange { beat, len: self.len });
        }
        Ok(Window { start, lane, count: count.min(self.len - start) })
    }

    /// number of beats needed to move the whole buffer
    pub fn beats(&self) -> usize {
        let lane0 = self.base_lane();
        match self.cut_beat() {
            Some(cut) if self.len > cut * self.size => {
                let head = self.width - lane0;
                if self.len <= head {
                    cut + 1
                } else {
                    cut + 1 + (self.len - head + self.size - 1) / self.size
                }
            }
            _ => (self.len + self.size - 1) / self.size,
        }
    }

    fn lane_of(&self, start: usize) -> usize {
        (self.base.wrapping_add(start as u64) % self.width as u64) as usize
    }
}
