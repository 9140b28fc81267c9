//! `gttcan` library: a time-triggered CAN protocol engine for `no_std`
//! targets. Nodes share a static slot schedule, transmit only in the slots
//! they own, and keep their clocks aligned by fault-tolerant averaging of the
//! arrival deviations of reference frames.
#![no_std]
//==================================================================================
/// Shared data types, capacities and payload conventions.
pub mod core;
/// Configuration and schedule-building errors.
pub mod error;
/// Bit-level helpers: bit streams, stuffing, on-wire frame length.
pub mod infra;
/// Protocol implementation: transport, schedule, synchronisation, engine.
pub mod protocol;
//==================================================================================
