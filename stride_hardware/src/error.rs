use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("driver fault {code} on axis {axis}")]
    Fault { axis: u8, code: u32 },
    #[error("axis {0} did not complete motion in time")]
    Timeout(u8),
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
