//! Encoding and decoding of the 32-bit time-triggered frame header.
//!
//! ```text
//!  31                  14 13                 0
//! +----------------------+--------------------+
//! |  schedule slot index |  data identifier   |
//! +----------------------+--------------------+
//! ```
use crate::core::DataId;

/// Bit position of the slot index inside the header.
pub const SLOT_INDEX_SHIFT: u32 = 14;

/// Mask of the data identifier bits.
pub const DATA_ID_MASK: u32 = (1 << SLOT_INDEX_SHIFT) - 1;

/// Largest encodable data identifier.
pub const MAX_DATA_ID: DataId = DATA_ID_MASK as DataId;

//==================================================================================FRAME_HEADER
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Raw frame header. Every 32-bit pattern decodes; validity of the slot index
/// is judged against a schedule, not here.
pub struct FrameHeader(pub u32);

impl FrameHeader {
    /// Build a header from a slot index and a data identifier.
    /// Data identifier bits above bit 13 are dropped.
    pub const fn new(slot_index: u16, data_id: DataId) -> Self {
        Self(((slot_index as u32) << SLOT_INDEX_SHIFT) | (data_id as u32 & DATA_ID_MASK))
    }

    /// Schedule slot index of the sender (bits 14 and above).
    pub const fn slot_index(&self) -> u32 {
        self.0 >> SLOT_INDEX_SHIFT
    }

    /// Data identifier of the payload (bits 0 to 13).
    pub const fn data_id(&self) -> DataId {
        (self.0 & DATA_ID_MASK) as DataId
    }

    /// Raw 32-bit value.
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl From<u32> for FrameHeader {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<FrameHeader> for u32 {
    fn from(header: FrameHeader) -> Self {
        header.0
    }
}
