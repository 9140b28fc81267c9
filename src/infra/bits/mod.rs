//! Bit-level view of CAN payloads: an MSB-first bit stream and the
//! stuffing/frame-length calculations built on top of it.
//!
//! The CAN physical layer inserts a bit of opposite polarity after every run
//! of five identical bits. Stuffing therefore lengthens a frame by an amount
//! that depends on its content, which matters when checking that a frame fits
//! inside its slot.

/// Run length that triggers the insertion of a stuff bit.
pub const STUFF_RUN_LENGTH: u32 = 5;

/// Fixed overhead of a classic data frame with a standard (11-bit) identifier:
/// SOF, identifier, RTR, IDE, r0, DLC, CRC, CRC delimiter, ACK slot, ACK
/// delimiter and EOF.
pub const STANDARD_FRAME_OVERHEAD_BITS: u32 = 1 + 11 + 1 + 1 + 1 + 4 + 15 + 1 + 1 + 1 + 7;

/// Same overhead with an extended (29-bit) identifier.
pub const EXTENDED_FRAME_OVERHEAD_BITS: u32 = 1 + 29 + 1 + 1 + 1 + 4 + 15 + 1 + 1 + 1 + 7;

//==================================================================================BIT_STREAM

/// Iterator over the bits of a byte slice, most-significant bit first,
/// concatenated across byte boundaries. No copy is made of the source.
pub struct BitStream<'a> {
    /// Source buffer.
    buffer: &'a [u8],
    /// Index of the next bit to yield, counted from the start of the buffer.
    bit_cursor: usize,
}

impl<'a> BitStream<'a> {
    /// Create a stream positioned at the first bit of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            bit_cursor: 0,
        }
    }

    /// Number of bits not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buffer.len() * 8 - self.bit_cursor
    }
}

impl Iterator for BitStream<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        let byte = *self.buffer.get(self.bit_cursor / 8)?;
        let shift = 7 - (self.bit_cursor % 8);
        self.bit_cursor += 1;
        Some((byte >> shift) & 1 == 1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitStream<'_> {}

//==================================================================================STUFFING

/// Count the stuff bits the physical layer would insert into `bytes`.
///
/// The bytes are scanned as one continuous MSB-first stream. Each time a run
/// of identical bits reaches [`STUFF_RUN_LENGTH`], one stuff bit is counted
/// and the run restarts at length 1 with the opposite polarity, as the
/// inserted bit always differs from the run it terminates.
pub fn calculate_stuffing_bits(bytes: &[u8]) -> u32 {
    let mut stuffed_bits = 0u32;
    let mut current: Option<bool> = None;
    let mut run_length = 0u32;

    for bit in BitStream::new(bytes) {
        if current == Some(bit) {
            run_length += 1;
        } else {
            current = Some(bit);
            run_length = 1;
        }

        if run_length == STUFF_RUN_LENGTH {
            stuffed_bits += 1;
            current = Some(!bit);
            run_length = 1;
        }
    }
    stuffed_bits
}

/// Total number of bits a classic data frame occupies on the bus: fixed
/// overhead, eight bits per payload byte, and the stuff bits of the payload.
///
/// Only the payload is scanned for stuffing; the identifier and CRC fields
/// add a bounded amount the caller folds into its frame offset.
pub fn can_frame_bits(payload: &[u8], is_extended: bool) -> u32 {
    let overhead = if is_extended {
        EXTENDED_FRAME_OVERHEAD_BITS
    } else {
        STANDARD_FRAME_OVERHEAD_BITS
    };
    overhead + payload.len() as u32 * 8 + calculate_stuffing_bits(payload)
}
