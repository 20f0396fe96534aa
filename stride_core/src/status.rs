//! Status returned from each command-loop iteration.

use crate::error::StrideError;

/// Public status of a single step of the command loop.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopStatus {
    /// Keep going.
    Running,
    /// The target source asked to exit; both axes already stopped.
    Complete,
    /// Aborted with a typed error; both axes have been asked to stop.
    Aborted(StrideError),
}
