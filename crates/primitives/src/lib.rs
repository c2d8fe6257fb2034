//! Shared primitive types for the Lumen explorer: fixed-size hash buffers,
//! transaction and participant enums, and the per-network chain parameters.

pub mod buf;
pub mod constants;
pub mod params;
pub mod tx;
