//! Utility functions and supporting infrastructure.
//!
//! Provides the bounds-checked byte cursor used by the container parsers,
//! error types, and sample/time conversions.

pub mod cursor;
pub mod errors;
pub mod frame_time;
