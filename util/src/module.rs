//! Display module lifecycle
//!
//! Every display driven by the ground executable goes through the same three stages: it is
//! initialised once from its parameter file, processed once per cycle, and torn down when the
//! executable stops. Implementing [`State`] is what lets the main loop drive a display without
//! knowing what it draws.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Lifecycle of a display module.
pub trait State {
    /// Name used when logging about this module.
    const NAME: &'static str;

    type InitData;
    type InitError;

    /// Telemetry snapshot consumed by one cycle.
    type InputData;
    /// What the display shows after the cycle.
    type OutputData;
    /// Summary of what happened during the cycle, cleared by the caller each cycle.
    type StatusReport;
    type ProcError;

    /// Load parameters and any assets. Must succeed before `proc` is called.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one display cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;

    /// Cancel anything scheduled by the module.
    ///
    /// `proc` may still be called afterwards but no scheduled work will run.
    fn teardown(&mut self) {}
}
