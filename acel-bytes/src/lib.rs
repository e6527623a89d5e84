
pub mod error;
pub use error::Error;

pub mod word;
pub use word::{Strobe, Word, MAX_LANES};

pub mod layout;
pub use layout::{BeatLayout, Window};

pub mod marshal;
pub use marshal::{pack_beat, unpack_beat};
