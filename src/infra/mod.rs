//! Low-level helpers shared by the transport layer.
pub mod bits;
