//! Error definitions shared across library modules.
//! Configuration problems are the only fatal condition: every protocol-level
//! anomaly (unknown slot, late frame, wild deviation) is absorbed by the
//! synchronisation statistic instead of being surfaced.
use thiserror_no_std::Error;

//==================================================================================HAL_CALLBACK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Names one of the four HAL capabilities bound at construction.
pub enum HalCallback {
    /// Push a value onto the bus.
    Transmit,
    /// Request a timer interrupt.
    ArmTimer,
    /// Fetch an application value.
    ReadValue,
    /// Deliver a received value to the application.
    WriteValue,
}

impl core::fmt::Display for HalCallback {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            HalCallback::Transmit => "transmit",
            HalCallback::ArmTimer => "arm_timer",
            HalCallback::ReadValue => "read_value",
            HalCallback::WriteValue => "write_value",
        };
        f.write_str(name)
    }
}

//==================================================================================CONFIGURATION_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors raised while building an engine. The host must not proceed with an
/// engine that failed to configure.
pub enum ConfigurationError {
    /// A required HAL callback binding was not supplied.
    #[error("Missing HAL callback: {0}")]
    MissingCallback(HalCallback),
    /// Node identifier 0 marks free slots and cannot own one.
    #[error("Local node id must not be the unassigned id 0")]
    UnassignedNodeId,
    /// A slot of zero ticks cannot be scheduled.
    #[error("Slot duration must be non-zero")]
    ZeroSlotDuration,
    /// The schedule cycle must contain at least one slot.
    #[error("Schedule length must be non-zero")]
    EmptySchedule,
    /// The schedule cycle exceeds the compile-time slot capacity.
    #[error("Schedule length {length} exceeds capacity {max}")]
    ScheduleTooLong { length: u16, max: usize },
    /// The supplied table holds fewer entries than the configured cycle.
    #[error("Schedule table holds {available} entries, {length} required")]
    ScheduleTableTooShort { length: u16, available: usize },
    /// A schedule entry names a data identifier wider than the header field.
    #[error("Slot {slot}: data identifier {data_id} does not fit in 14 bits")]
    DataIdTooWide { slot: u16, data_id: u16 },
}

//==================================================================================SCHEDULE_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors raised while filling a fixed-capacity schedule table.
pub enum ScheduleError {
    /// No room left in the table.
    #[error("Schedule table full (capacity {capacity})")]
    Full { capacity: usize },
    /// Data identifiers are carried on 14 bits.
    #[error("Data identifier {data_id} does not fit in 14 bits")]
    DataIdTooWide { data_id: u16 },
}
