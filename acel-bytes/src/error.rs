//! byte-level errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("bus width of {0} bytes is not a power of two in 1..={max}", max = crate::MAX_LANES)]
    BusWidth(usize),
    #[error("beat size of {size} bytes is not a power of two no wider than the {width}-byte bus")]
    BeatSize { size: usize, width: usize },
    #[error("beat {beat} lies outside a {len}-byte transfer")]
    BeatOutOfRange { beat: usize, len: usize },
    #[error("buffer of {got} bytes is shorter than the {expected}-byte transfer")]
    Buffer { got: usize, expected: usize },
    #[error("data word of {got} lanes does not match the {expected}-byte bus")]
    WordWidth { got: usize, expected: usize },
}
