//! Time-triggered protocol: transport (header, frames, HAL), static schedule,
//! clock synchronisation, and the per-node engine tying them together.
pub mod engine;
pub mod schedule;
pub mod sync;
pub mod transport;
