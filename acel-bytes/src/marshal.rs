//! beat data marshaling
//!
//! `pack_beat` produces the data word and strobe driven for one write beat,
//! `unpack_beat` consumes the data word sampled for one read beat. both go
//! through `BeatLayout::window`, so a beat moves exactly the same bytes over
//! exactly the same lanes in either direction.

use crate::{BeatLayout, Error, Strobe, Word};

/// build the data word and strobe for `beat`
///
/// `byte_enable` follows generic-payload semantics: entry `i` qualifies
/// buffer byte `i`, and a pattern shorter than the buffer repeats. without a
/// pattern every byte the beat carries is strobed.
pub fn pack_beat(
    layout: &BeatLayout,
    beat: usize,
    data: &[u8],
    byte_enable: Option<&[bool]>,
) -> Result<(Word, Strobe), Error> {
    check_buffer(layout, data.len())?;
    let window = layout.window(beat)?;

    let mut word = Word::zeroed(layout.width());
    let mut strobe = Strobe::NONE;
    word.lanes_mut()[window.lanes()].copy_from_slice(&data[window.bytes()]);

    for (lane, index) in window.lanes().zip(window.bytes()) {
        let enabled = match byte_enable {
            Some(pattern) if !pattern.is_empty() => pattern[index % pattern.len()],
            _ => true,
        };
        strobe.set(lane, enabled);
    }
    Ok((word, strobe))
}

/// copy the lanes `beat` occupies in `word` back into the transfer buffer
pub fn unpack_beat(
    layout: &BeatLayout,
    beat: usize,
    word: &Word,
    data: &mut [u8],
) -> Result<(), Error> {
    check_buffer(layout, data.len())?;
    word.check_width(layout.width())?;
    let window = layout.window(beat)?;

    data[window.bytes()].copy_from_slice(&word.lanes()[window.lanes()]);
    Ok(())
}

fn check_buffer(layout: &BeatLayout, got: usize) -> Result<(), Error> {
    if got < layout.len() {
        return Err(Error::Buffer { got, expected: layout.len() });
    }
    Ok(())
}
