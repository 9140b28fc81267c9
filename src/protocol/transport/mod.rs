//! Time-triggered transport layer: header layout, frame representation, and
//! the HAL contract through which the engine reaches the bus and the timer.
//!
//! ## Timing constants
//!
//! Ticks are network time units (NTU) of 0.1 µs on the reference hardware.

pub mod can_frame;
pub mod frame_header;
pub mod traits;

use crate::core::Ticks;

/// Default delay between the start of a reference frame on the bus and the
/// moment its reception is latched by the receiver (NTU).
///
/// The value covers propagation and controller latency plus the average
/// stuffing of an 8-byte payload. It is not exact because stuffing depends on
/// the frame content, but it brings the measured arrival time within a few
/// ticks of the transmitter's slot start.
///
/// # Recommended values
///
/// - **1480**: host controllers at 1 Mbit/s
/// - **1600**: STM32 bxCAN at 1 Mbit/s
pub const DEFAULT_FRAME_OFFSET_TICKS: Ticks = 1480;

/// Offset measured on STM32 bxCAN controllers (NTU).
pub const STM32_FRAME_OFFSET_TICKS: Ticks = 1600;

/// Ticks per bit at 1 Mbit/s with 0.1 µs ticks.
pub const TICKS_PER_BIT_1MBIT: Ticks = 10;
