//! transaction model
//!
//! the generic transaction plus the ACE-Lite attribute extension the
//! requester attaches to it

use std::fmt;
use std::sync::Arc;

use bitfield_struct::bitfield;
use parking_lot::Mutex;

/// a transaction shared between the requester and the adapter
pub type SharedTransaction = Arc<Mutex<Transaction>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Read = 0,
    Write = 1,
}

impl Command {
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Burst {
    Fixed = 0,
    #[default]
    Incr = 1,
    Wrap = 2,
}

/// response code of a beat or a whole transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resp {
    #[default]
    Okay = 0,
    ExOkay = 1,
    SlvErr = 2,
    DecErr = 3,
}

impl Resp {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Okay,
            1 => Self::ExOkay,
            2 => Self::SlvErr,
            _ => Self::DecErr,
        }
    }

    pub fn is_ok(self) -> bool {
        matches!(self, Self::Okay | Self::ExOkay)
    }
}

/// shareability domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Domain {
    #[default]
    NonShareable = 0,
    InnerShareable = 1,
    OuterShareable = 2,
    System = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Barrier {
    #[default]
    Respect = 0,
    Memory = 1,
    Ignore = 2,
    Synchronization = 3,
}

/// AxPROT
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct Prot {
    pub privileged: bool,
    pub non_secure: bool,
    pub instruction: bool,
    #[bits(5)]
    __: u8,
}

/// AxCACHE
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct Cache {
    pub bufferable: bool,
    pub modifiable: bool,
    pub allocate: bool,
    pub other_allocate: bool,
    #[bits(4)]
    __: u8,
}

/// ACE-Lite attributes of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AceAttrs {
    pub id: u32,
    /// AxLEN: beats in the burst minus one
    pub length: u8,
    /// AxSIZE: log2 of the bytes per beat
    pub size: u8,
    pub burst: Burst,
    pub cache: Cache,
    pub prot: Prot,
    pub qos: u8,
    pub region: u8,
    /// address channel user bits
    pub user: u32,
    /// write data channel user bits
    pub data_user: u32,
    pub domain: Domain,
    /// ARSNOOP / AWSNOOP encoding
    pub snoop: u8,
    pub barrier: Barrier,
    /// stash target node id, driven with its enable when present
    pub stash_nid: Option<u16>,
    /// stash logical processor id, driven with its enable when present
    pub stash_lpid: Option<u8>,
    /// aggregate response
    pub resp: Resp,
    /// per-beat read responses, in arrival order
    pub responses: Vec<Resp>,
}

/// completion status of the transaction as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Incomplete,
    Ok,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    command: Command,
    address: u64,
    data: Vec<u8>,
    byte_enable: Option<Vec<bool>>,
    attrs: AceAttrs,
    status: Status,
}

impl Transaction {
    /// a single-beat read of `len` bytes
    pub fn read(address: u64, len: usize) -> Self {
        Self::new(Command::Read, address, vec![0u8; len])
    }

    /// a single-beat write of `data`
    pub fn write(address: u64, data: Vec<u8>) -> Self {
        Self::new(Command::Write, address, data)
    }

    fn new(command: Command, address: u64, data: Vec<u8>) -> Self {
        let size = data.len().max(1).next_power_of_two().trailing_zeros() as u8;
        Self {
            command,
            address,
            data,
            byte_enable: None,
            attrs: AceAttrs { size, ..AceAttrs::default() },
            status: Status::Incomplete,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.attrs.id = id;
        self
    }

    /// burst of `beats` beats moving `beat_bytes` bytes each
    ///
    /// the length field holds at most 256 beats, longer bursts are clamped
    /// and rejected when the request begins
    pub fn with_shape(mut self, beats: usize, beat_bytes: usize) -> Self {
        self.attrs.length = (beats.clamp(1, 256) - 1) as u8;
        self.attrs.size = beat_bytes.max(1).next_power_of_two().trailing_zeros() as u8;
        self
    }

    pub fn with_byte_enable(mut self, byte_enable: Vec<bool>) -> Self {
        self.byte_enable = Some(byte_enable);
        self
    }

    pub fn with_attrs(mut self, f: impl FnOnce(&mut AceAttrs)) -> Self {
        f(&mut self.attrs);
        self
    }

    pub fn shared(self) -> SharedTransaction {
        Arc::new(Mutex::new(self))
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn is_read(&self) -> bool {
        self.command == Command::Read
    }

    pub fn is_write(&self) -> bool {
        self.command == Command::Write
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn byte_enable(&self) -> Option<&[bool]> {
        self.byte_enable.as_deref()
    }

    pub fn attrs(&self) -> &AceAttrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut AceAttrs {
        &mut self.attrs
    }

    pub fn id(&self) -> u32 {
        self.attrs.id
    }

    /// beats in the burst
    pub fn beats(&self) -> usize {
        self.attrs.length as usize + 1
    }

    /// bytes per beat; only the low three bits of the size field count
    pub fn beat_bytes(&self) -> usize {
        1usize << (self.attrs.size & 0x7)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} id {} @ {:#x} len {} ({}x{})",
            self.command,
            self.attrs.id,
            self.address,
            self.data.len(),
            self.beats(),
            self.beat_bytes(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beat_bytes_reads_the_size_field() {
        let t = Transaction::read(0x0, 64).with_shape(1, 16);
        assert_eq!(t.beat_bytes(), 16);

        let t = Transaction::read(0x0, 8).with_attrs(|attrs| attrs.size = 70);
        assert_eq!(t.beat_bytes(), 64);
    }

    #[test]
    fn test_shape_clamps_the_length_field() {
        let t = Transaction::write(0x0, vec![0; 8 * 300]).with_shape(300, 8);
        assert_eq!(t.beats(), 256);
        assert_eq!(Transaction::read(0x0, 8).with_shape(0, 8).beats(), 1);
    }
}
