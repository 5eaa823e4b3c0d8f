//! # Communications interface crate.
//!
//! Provides the telemetry interface types consumed by the basestation.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telemetry definitions (IMU data, rover position and the frames carrying them)
pub mod tm;
