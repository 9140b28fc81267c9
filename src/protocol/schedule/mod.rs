//! Static schedule: which node transmits in which slot, which application
//! value it sends, and which slots serve as synchronisation references.
//!
//! Tables are supplied by the host and never change at run time. Storage is
//! fixed-size: either a plain array/slice of [`ScheduleEntry`] or the
//! [`ScheduleTable`] builder.
use crate::core::{DataId, NodeId, MAX_LOCAL_SCHEDULE_LENGTH, UNASSIGNED_NODE};
use crate::error::ScheduleError;
use crate::protocol::transport::frame_header::MAX_DATA_ID;

//==================================================================================SCHEDULE_ENTRY
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// One slot of the schedule cycle.
pub struct ScheduleEntry {
    /// Node allowed to transmit in the slot ([`UNASSIGNED_NODE`] when free).
    pub node_id: NodeId,
    /// Application value sent in the slot.
    pub data_id: DataId,
    /// Arrival of this slot's frame is used to measure clock deviation.
    pub is_reference: bool,
}

impl ScheduleEntry {
    /// Slot nobody transmits in.
    pub const FREE: Self = Self {
        node_id: UNASSIGNED_NODE,
        data_id: 0,
        is_reference: false,
    };

    /// Slot whose frame acts as a synchronisation reference.
    pub const fn reference(node_id: NodeId, data_id: DataId) -> Self {
        Self {
            node_id,
            data_id,
            is_reference: true,
        }
    }

    /// Plain data slot.
    pub const fn data(node_id: NodeId, data_id: DataId) -> Self {
        Self {
            node_id,
            data_id,
            is_reference: false,
        }
    }

    pub const fn free() -> Self {
        Self::FREE
    }

    pub const fn is_free(&self) -> bool {
        self.node_id == UNASSIGNED_NODE
    }

    /// Whether `node_id` transmits in this slot.
    pub const fn is_owned_by(&self, node_id: NodeId) -> bool {
        !self.is_free() && self.node_id == node_id
    }
}

impl Default for ScheduleEntry {
    fn default() -> Self {
        Self::FREE
    }
}

//==================================================================================SCHEDULE_TABLE
/// Fixed-capacity schedule builder. Slot `i` is the `i`-th pushed entry.
#[derive(Clone, Copy, Debug)]
pub struct ScheduleTable<const N: usize> {
    entries: [ScheduleEntry; N],
    len: usize,
}

impl<const N: usize> Default for ScheduleTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ScheduleTable<N> {
    /// Empty table.
    pub const fn new() -> Self {
        Self {
            entries: [ScheduleEntry::FREE; N],
            len: 0,
        }
    }

    /// Append the next slot.
    pub fn push(&mut self, entry: ScheduleEntry) -> Result<(), ScheduleError> {
        if entry.data_id > MAX_DATA_ID {
            return Err(ScheduleError::DataIdTooWide {
                data_id: entry.data_id,
            });
        }
        let slot = self
            .entries
            .get_mut(self.len)
            .ok_or(ScheduleError::Full { capacity: N })?;
        *slot = entry;
        self.len += 1;
        Ok(())
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, entry: ScheduleEntry) -> Result<Self, ScheduleError> {
        self.push(entry)?;
        Ok(self)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Populated slots.
    #[inline]
    pub fn as_slice(&self) -> &[ScheduleEntry] {
        &self.entries[..self.len]
    }
}

impl<const N: usize> AsRef<[ScheduleEntry]> for ScheduleTable<N> {
    fn as_ref(&self) -> &[ScheduleEntry] {
        self.as_slice()
    }
}

//==================================================================================LOCAL_SCHEDULE
/// Slots owned by one node, in cycle order.
///
/// Derived once from the table. At most [`MAX_LOCAL_SCHEDULE_LENGTH`] slots are
/// kept; later ones are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalSchedule {
    slots: [u16; MAX_LOCAL_SCHEDULE_LENGTH],
    len: usize,
}

impl LocalSchedule {
    /// Collect the slots of `table` owned by `node_id`.
    pub fn derive(table: &[ScheduleEntry], node_id: NodeId) -> Self {
        let mut local = Self {
            slots: [0; MAX_LOCAL_SCHEDULE_LENGTH],
            len: 0,
        };
        let owned = table
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_owned_by(node_id));
        for (slot, _) in owned {
            if local.len == MAX_LOCAL_SCHEDULE_LENGTH {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "Node {} owns more than {} slots, ignoring slot {}",
                    node_id,
                    MAX_LOCAL_SCHEDULE_LENGTH,
                    slot
                );
                break;
            }
            local.slots[local.len] = slot as u16;
            local.len += 1;
        }
        local
    }

    /// Owned slot indices in ascending order.
    pub fn slots(&self) -> &[u16] {
        &self.slots[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First owned slot of the cycle.
    pub fn first(&self) -> Option<u16> {
        self.slots().first().copied()
    }

    /// Number of slot boundaries between `from` and the next owned slot,
    /// wrapping around a cycle of `schedule_length` slots. When `from` is the
    /// only owned slot the answer is a full cycle.
    pub fn slots_until_next_owned(&self, from: u16, schedule_length: u16) -> Option<u16> {
        self.slots()
            .iter()
            .map(|&slot| {
                if slot > from {
                    slot - from
                } else {
                    schedule_length - from + slot
                }
            })
            .min()
    }
}
