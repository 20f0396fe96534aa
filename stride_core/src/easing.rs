//! Easing catalog: maps normalized progress `k` in `[0, 1]` onto a shaped progress.
//!
//! Every curve returns `k` unchanged at `k == 0` and `k == 1`, so ramps land exactly on their
//! endpoints whatever the shape. Dispatch is a table lookup from [`EasingCurve`] to a plain
//! `fn(f64) -> f64`.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::str::FromStr;

use crate::error::BuildError;

const BACK_OVERSHOOT: f64 = 1.70158;
const BACK_INOUT_SCALE: f64 = 1.525;
const BOUNCE_GAIN: f64 = 7.5625;
const BOUNCE_SPAN: f64 = 2.75;
const ELASTIC_AMPLITUDE: f64 = 1.0;
const ELASTIC_PERIOD: f64 = 0.3;

/// Closed set of curve selectors. Discriminants are the wire/config codes `0x00..=0x1F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum EasingCurve {
    /// Inert: a ramp using this curve never recomputes its value on tick.
    None = 0x00,
    #[default]
    Linear = 0x01,
    QuadraticIn = 0x02,
    QuadraticOut = 0x03,
    QuadraticInOut = 0x04,
    CubicIn = 0x05,
    CubicOut = 0x06,
    CubicInOut = 0x07,
    QuarticIn = 0x08,
    QuarticOut = 0x09,
    QuarticInOut = 0x0A,
    QuinticIn = 0x0B,
    QuinticOut = 0x0C,
    QuinticInOut = 0x0D,
    SinusoidalIn = 0x0E,
    SinusoidalOut = 0x0F,
    SinusoidalInOut = 0x10,
    ExponentialIn = 0x11,
    ExponentialOut = 0x12,
    ExponentialInOut = 0x13,
    CircularIn = 0x14,
    CircularOut = 0x15,
    CircularInOut = 0x16,
    ElasticIn = 0x17,
    ElasticOut = 0x18,
    ElasticInOut = 0x19,
    BackIn = 0x1A,
    BackOut = 0x1B,
    BackInOut = 0x1C,
    BounceIn = 0x1D,
    BounceOut = 0x1E,
    BounceInOut = 0x1F,
}

impl EasingCurve {
    /// Every selector in code order.
    pub const ALL: [Self; 32] = [
        Self::None,
        Self::Linear,
        Self::QuadraticIn,
        Self::QuadraticOut,
        Self::QuadraticInOut,
        Self::CubicIn,
        Self::CubicOut,
        Self::CubicInOut,
        Self::QuarticIn,
        Self::QuarticOut,
        Self::QuarticInOut,
        Self::QuinticIn,
        Self::QuinticOut,
        Self::QuinticInOut,
        Self::SinusoidalIn,
        Self::SinusoidalOut,
        Self::SinusoidalInOut,
        Self::ExponentialIn,
        Self::ExponentialOut,
        Self::ExponentialInOut,
        Self::CircularIn,
        Self::CircularOut,
        Self::CircularInOut,
        Self::ElasticIn,
        Self::ElasticOut,
        Self::ElasticInOut,
        Self::BackIn,
        Self::BackOut,
        Self::BackInOut,
        Self::BounceIn,
        Self::BounceOut,
        Self::BounceInOut,
    ];

    /// Shaping function for this curve. `None` maps to the identity.
    pub fn function(self) -> fn(f64) -> f64 {
        match self {
            Self::None | Self::Linear => linear,
            Self::QuadraticIn => |k| powin(k, 2),
            Self::QuadraticOut => |k| powout(k, 2),
            Self::QuadraticInOut => |k| powinout(k, 2),
            Self::CubicIn => |k| powin(k, 3),
            Self::CubicOut => |k| powout(k, 3),
            Self::CubicInOut => |k| powinout(k, 3),
            Self::QuarticIn => |k| powin(k, 4),
            Self::QuarticOut => |k| powout(k, 4),
            Self::QuarticInOut => |k| powinout(k, 4),
            Self::QuinticIn => |k| powin(k, 5),
            Self::QuinticOut => |k| powout(k, 5),
            Self::QuinticInOut => |k| powinout(k, 5),
            Self::SinusoidalIn => sine_in,
            Self::SinusoidalOut => sine_out,
            Self::SinusoidalInOut => sine_in_out,
            Self::ExponentialIn => expo_in,
            Self::ExponentialOut => expo_out,
            Self::ExponentialInOut => expo_in_out,
            Self::CircularIn => circ_in,
            Self::CircularOut => circ_out,
            Self::CircularInOut => circ_in_out,
            Self::ElasticIn => elastic_in,
            Self::ElasticOut => elastic_out,
            Self::ElasticInOut => elastic_in_out,
            Self::BackIn => back_in,
            Self::BackOut => back_out,
            Self::BackInOut => back_in_out,
            Self::BounceIn => bounce_in,
            Self::BounceOut => bounce_out,
            Self::BounceInOut => bounce_in_out,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Linear => "linear",
            Self::QuadraticIn => "quadratic_in",
            Self::QuadraticOut => "quadratic_out",
            Self::QuadraticInOut => "quadratic_in_out",
            Self::CubicIn => "cubic_in",
            Self::CubicOut => "cubic_out",
            Self::CubicInOut => "cubic_in_out",
            Self::QuarticIn => "quartic_in",
            Self::QuarticOut => "quartic_out",
            Self::QuarticInOut => "quartic_in_out",
            Self::QuinticIn => "quintic_in",
            Self::QuinticOut => "quintic_out",
            Self::QuinticInOut => "quintic_in_out",
            Self::SinusoidalIn => "sinusoidal_in",
            Self::SinusoidalOut => "sinusoidal_out",
            Self::SinusoidalInOut => "sinusoidal_in_out",
            Self::ExponentialIn => "exponential_in",
            Self::ExponentialOut => "exponential_out",
            Self::ExponentialInOut => "exponential_in_out",
            Self::CircularIn => "circular_in",
            Self::CircularOut => "circular_out",
            Self::CircularInOut => "circular_in_out",
            Self::ElasticIn => "elastic_in",
            Self::ElasticOut => "elastic_out",
            Self::ElasticInOut => "elastic_in_out",
            Self::BackIn => "back_in",
            Self::BackOut => "back_out",
            Self::BackInOut => "back_in_out",
            Self::BounceIn => "bounce_in",
            Self::BounceOut => "bounce_out",
            Self::BounceInOut => "bounce_in_out",
        }
    }
}

impl fmt::Display for EasingCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for EasingCurve {
    type Error = BuildError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or_else(|| BuildError::UnknownCurve(format!("0x{code:02X}")))
    }
}

impl FromStr for EasingCurve {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| BuildError::UnknownCurve(s.to_string()))
    }
}

/// Shape progress `k` with `curve`. Endpoints pass through unchanged.
#[inline]
pub fn shape(k: f64, curve: EasingCurve) -> f64 {
    if k == 0.0 || k == 1.0 {
        return k;
    }
    (curve.function())(k)
}

#[inline]
fn linear(k: f64) -> f64 {
    k
}

// Repeated multiplication keeps `powin(k, 2) == k * k` bit-for-bit.
#[inline]
fn ipow(base: f64, p: u32) -> f64 {
    (0..p).fold(1.0, |acc, _| acc * base)
}

#[inline]
fn powin(k: f64, p: u32) -> f64 {
    ipow(k, p)
}

#[inline]
fn powout(k: f64, p: u32) -> f64 {
    1.0 - ipow(1.0 - k, p)
}

#[inline]
fn powinout(k: f64, p: u32) -> f64 {
    let k2 = k * 2.0;
    if k2 < 1.0 {
        0.5 * ipow(k2, p)
    } else {
        1.0 - 0.5 * ipow(2.0 - k2, p).abs()
    }
}

fn sine_in(k: f64) -> f64 {
    1.0 - (k * FRAC_PI_2).cos()
}

fn sine_out(k: f64) -> f64 {
    (k * FRAC_PI_2).sin()
}

fn sine_in_out(k: f64) -> f64 {
    -0.5 * ((PI * k).cos() - 1.0)
}

fn expo_in(k: f64) -> f64 {
    2f64.powf(10.0 * (k - 1.0))
}

fn expo_out(k: f64) -> f64 {
    1.0 - 2f64.powf(-10.0 * k)
}

fn expo_in_out(k: f64) -> f64 {
    let k2 = k * 2.0;
    if k2 < 1.0 {
        0.5 * 2f64.powf(10.0 * (k2 - 1.0))
    } else {
        0.5 * (2.0 - 2f64.powf(-10.0 * (k2 - 1.0)))
    }
}

fn circ_in(k: f64) -> f64 {
    -((1.0 - k * k).sqrt() - 1.0)
}

fn circ_out(k: f64) -> f64 {
    let k2 = k - 1.0;
    (1.0 - k2 * k2).sqrt()
}

fn circ_in_out(k: f64) -> f64 {
    let k2 = k * 2.0;
    if k2 < 1.0 {
        -0.5 * ((1.0 - k2 * k2).sqrt() - 1.0)
    } else {
        let k3 = k2 - 2.0;
        0.5 * ((1.0 - k3 * k3).sqrt() + 1.0)
    }
}

/// Phase shift of the damped sinusoid for period `p` and amplitude 1.
#[inline]
fn elastic_shift(p: f64) -> f64 {
    p * (1.0 / ELASTIC_AMPLITUDE).asin() / TAU
}

// In and InOut stretch the period by 1.5; Out uses the base period.
fn elastic_in(k: f64) -> f64 {
    let p = ELASTIC_PERIOD * 1.5;
    let s = elastic_shift(p);
    let k2 = k - 1.0;
    -(ELASTIC_AMPLITUDE * 2f64.powf(10.0 * k2) * ((k2 - s) * TAU / p).sin())
}

fn elastic_out(k: f64) -> f64 {
    let p = ELASTIC_PERIOD;
    let s = elastic_shift(p);
    ELASTIC_AMPLITUDE * 2f64.powf(-10.0 * k) * ((k - s) * TAU / p).sin() + 1.0
}

fn elastic_in_out(k: f64) -> f64 {
    let p = ELASTIC_PERIOD * 1.5;
    let s = elastic_shift(p);
    let k2 = 2.0 * k - 1.0;
    if k2 < 0.0 {
        -0.5 * (ELASTIC_AMPLITUDE * 2f64.powf(10.0 * k2) * ((k2 - s) * TAU / p).sin())
    } else {
        0.5 * ELASTIC_AMPLITUDE * 2f64.powf(-10.0 * k2) * ((k2 - s) * TAU / p).sin() + 1.0
    }
}

fn back_in(k: f64) -> f64 {
    let s = BACK_OVERSHOOT;
    k * k * ((s + 1.0) * k - s)
}

fn back_out(k: f64) -> f64 {
    let s = BACK_OVERSHOOT;
    let k2 = k - 1.0;
    k2 * k2 * ((s + 1.0) * k2 + s) + 1.0
}

fn back_in_out(k: f64) -> f64 {
    let s = BACK_OVERSHOOT * BACK_INOUT_SCALE;
    let k2 = k * 2.0;
    if k2 < 1.0 {
        0.5 * (k2 * k2 * ((s + 1.0) * k2 - s))
    } else {
        let k3 = k2 - 2.0;
        0.5 * (k3 * k3 * ((s + 1.0) * k3 + s) + 2.0)
    }
}

fn bounce_in(k: f64) -> f64 {
    1.0 - shape(1.0 - k, EasingCurve::BounceOut)
}

fn bounce_out(k: f64) -> f64 {
    if k < 1.0 / BOUNCE_SPAN {
        BOUNCE_GAIN * k * k
    } else if k < 2.0 / BOUNCE_SPAN {
        let k2 = k - 1.5 / BOUNCE_SPAN;
        BOUNCE_GAIN * k2 * k2 + 0.75
    } else if k < 2.5 / BOUNCE_SPAN {
        let k2 = k - 2.25 / BOUNCE_SPAN;
        BOUNCE_GAIN * k2 * k2 + 0.9375
    } else {
        let k2 = k - 2.625 / BOUNCE_SPAN;
        BOUNCE_GAIN * k2 * k2 + 0.984_375
    }
}

fn bounce_in_out(k: f64) -> f64 {
    if k < 0.5 {
        shape(k * 2.0, EasingCurve::BounceIn) * 0.5
    } else {
        shape(k * 2.0 - 1.0, EasingCurve::BounceOut) * 0.5 + 0.5
    }
}
