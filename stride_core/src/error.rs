use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrideError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for driver")]
    Timeout,
    #[error("invalid state: {0}")]
    State(String),
    #[error("homing failed: {0}")]
    Homing(#[from] HomingFailure),
    #[error("aborted: {0}")]
    Abort(AbortReason),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing actuator for axis slot {0}")]
    MissingActuator(usize),
    #[error("missing kinematics model")]
    MissingKinematics,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("unknown easing curve: {0}")]
    UnknownCurve(String),
    #[error("unknown loop mode: {0}")]
    UnknownLoopMode(String),
}

/// Why a homing run ended in `Failed`. Homing never retries on its own.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HomingFailure {
    #[error("no resistance found on axis {axis} within {steps} seek steps")]
    NoResistance { axis: u8, steps: u32 },
    #[error("limit search on axis {axis} timed out after {elapsed_ms} ms")]
    Timeout { axis: u8, elapsed_ms: u64 },
    #[error("driver fault {code} on axis {axis}")]
    Fault { axis: u8, code: u32 },
    #[error("driver error on axis {axis}: {message}")]
    Driver { axis: u8, message: String },
}

impl HomingFailure {
    /// Missing resistance is an operator problem; faults and driver errors are not.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoResistance { .. } | Self::Timeout { .. })
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    #[error("cancelled")]
    Cancelled,
    #[error("driver fault {code} on axis {axis}")]
    Fault { axis: u8, code: u32 },
    #[error("max runtime exceeded")]
    MaxRuntime,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
