#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Motion core for a two-joint leg (hardware-agnostic).
//!
//! All hardware interactions go through `stride_traits::Actuator` and
//! `stride_traits::InputDevice`; time comes from an injected `stride_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Easing**: closed catalog of 32 shaping curves (`easing` module)
//! - **Ramp**: single-axis origin/target/cursor state machine (`ramp` module)
//! - **Interpolation**: restart-on-change wrapper per axis (`interpolator` module)
//! - **Homing**: torque-resistance limit finding and re-zeroing (`homing` module)
//! - **Loop**: target sources, kinematics, the two-axis command loop and its runner
//! - **Configuration**: runtime config structs (`config` module), bridged from
//!   `stride_config` in `conversions`

pub mod builder;
pub mod command;
pub mod config;
pub mod conversions;
pub mod easing;
pub mod error;
pub mod filter;
pub mod homing;
pub mod hw_error;
pub mod interpolator;
pub mod kinematics;
pub mod mocks;
pub mod ramp;
pub mod runner;
pub mod source;
pub mod status;

pub use builder::CommandLoopBuilder;
pub use command::{Axis, CommandLoop, RunSummary};
pub use config::{CommandCfg, HomingCfg, InputCfg, KinematicsCfg, RampCfg, ScriptCfg};
pub use easing::{EasingCurve, shape};
pub use error::{AbortReason, BuildError, HomingFailure, StrideError};
pub use filter::LowPass;
pub use homing::{Homing, HomingPhase, HomingReport};
pub use interpolator::AxisInterpolator;
pub use kinematics::{Kinematics, TwoLinkLeg};
pub use ramp::{Direction, DriveMode, LoopMode, Ramp};
pub use source::{JoystickSource, LoopCommand, TargetSource, WaypointSource};
pub use status::LoopStatus;
