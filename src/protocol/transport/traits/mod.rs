//! Abstraction traits used by the engine to reach the bus, the timer, and the
//! application data store.
pub mod hal;
