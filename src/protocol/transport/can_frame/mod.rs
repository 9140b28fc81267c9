//! In-memory representation of a time-triggered frame and its mapping onto a
//! classic CAN data frame with an extended identifier.
use embedded_can::{ExtendedId, Frame, Id};

use crate::core::{Ticks, Value};
use crate::infra::bits::can_frame_bits;
use crate::protocol::transport::frame_header::FrameHeader;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Frame as seen by the engine: a header and an 8-byte value.
pub struct TtFrame {
    /// Slot index and data identifier.
    pub header: FrameHeader,
    /// Payload, little-endian on the wire.
    pub value: Value,
}

impl TtFrame {
    pub const fn new(header: FrameHeader, value: Value) -> Self {
        Self { header, value }
    }

    /// Convert a driver frame. Standard identifiers and remote frames do not
    /// belong to the time-triggered schedule and yield `None`. Short payloads
    /// are zero-extended.
    pub fn from_can<F: Frame>(frame: &F) -> Option<Self> {
        if frame.is_remote_frame() {
            return None;
        }
        let header = match frame.id() {
            Id::Extended(id) => FrameHeader(id.as_raw()),
            Id::Standard(_) => return None,
        };
        let mut bytes = [0u8; 8];
        let data = frame.data();
        let len = data.len().min(8);
        bytes[..len].copy_from_slice(&data[..len]);
        Some(Self {
            header,
            value: Value::from_le_bytes(bytes),
        })
    }

    /// Build a driver frame. Returns `None` when the header does not fit a
    /// 29-bit identifier or the driver refuses the frame.
    pub fn to_can<F: Frame>(&self) -> Option<F> {
        let id = ExtendedId::new(self.header.raw())?;
        F::new(id, &self.value.to_le_bytes())
    }

    /// Bits this frame occupies on the bus, stuffing included.
    pub fn wire_bits(&self) -> u32 {
        can_frame_bits(&self.value.to_le_bytes(), true)
    }

    /// Ticks needed to put this frame on the bus at `ticks_per_bit`.
    pub fn transmission_ticks(&self, ticks_per_bit: Ticks) -> Ticks {
        self.wire_bits().saturating_mul(ticks_per_bit)
    }
}

/// Checks that `frame` completes within a slot of `slot_duration` ticks.
pub fn frame_fits_slot(frame: &TtFrame, ticks_per_bit: Ticks, slot_duration: Ticks) -> bool {
    frame.transmission_ticks(ticks_per_bit) <= slot_duration
}
