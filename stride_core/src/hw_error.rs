//! Maps `Box<dyn Error>` from trait boundaries to typed `StrideError`.
//!
//! The traits in `stride_traits` use `Box<dyn Error + Send + Sync>` so any driver can plug in;
//! this module converts those to our typed error enum, with an optional feature-gated path for
//! `stride_hardware::HwError` downcasting.

use crate::error::{HomingFailure, StrideError};

/// Map a trait-boundary error to a typed `StrideError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> StrideError {
    #[cfg(feature = "hardware-errors")]
    {
        use stride_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Timeout(_) => StrideError::Timeout,
                HwError::InvalidCommand(msg) => StrideError::Hardware(msg.clone()),
                other => StrideError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        StrideError::Timeout
    } else if lower.contains("fault") {
        StrideError::HardwareFault(s)
    } else {
        StrideError::Hardware(s)
    }
}

/// Driver error raised while homing `axis`.
pub fn homing_driver_error(axis: u8, e: &(dyn std::error::Error + 'static)) -> HomingFailure {
    HomingFailure::Driver {
        axis,
        message: map_hw_error(e).to_string(),
    }
}
