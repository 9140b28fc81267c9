//! Core data types and capacities shared by the schedule, the transport layer,
//! and the synchronisation engine.
//!
//! Time is expressed in timer ticks. On the reference hardware a tick is one
//! network time unit (NTU) of 0.1 µs, but the engine never assumes a unit: it
//! only compares tick counts produced by the same timer.

/// Maximum number of slots a schedule cycle may contain.
pub const MAX_SLOTS: usize = 512;

/// Maximum number of slots a single node may own within one schedule cycle.
pub const MAX_LOCAL_SCHEDULE_LENGTH: usize = 32;

/// Number of nanoseconds in one network time unit.
pub const NTU_NANOS: u64 = 100;

/// Logical identifier of a node on the bus.
pub type NodeId = u8;

/// Identifier of an application value (14 bits on the wire).
pub type DataId = u16;

/// Timer tick count.
pub type Ticks = u32;

/// Value carried by a frame payload (the eight bytes of a classic CAN frame).
pub type Value = u64;

/// Node identifier reserved for slots nobody transmits in.
pub const UNASSIGNED_NODE: NodeId = 0;

/// Bit 63 of a reference frame payload flags the start of a schedule cycle.
pub const START_OF_SCHEDULE_FLAG: Value = 1 << 63;

/// Bits of a reference frame payload carrying the network time.
pub const NETWORK_TIME_MASK: Value = 0x3FFF_FFFF_FFFF_FFFF;

/// Returns `true` when the payload announces the start of a schedule cycle.
#[inline]
pub const fn is_start_of_schedule(value: Value) -> bool {
    value & START_OF_SCHEDULE_FLAG != 0
}

/// Network time carried by a reference frame payload.
#[inline]
pub const fn network_time(value: Value) -> Value {
    value & NETWORK_TIME_MASK
}
