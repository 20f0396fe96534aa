/// Default weight of the previous output in [`LowPass`].
pub const DEFAULT_WEIGHT: u32 = 15;

/// First-order low-pass: `y = (x + prev * w) / (w + 1)`.
///
/// One instance per input channel. The first sample passes through unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPass {
    weight: f64,
    prev: Option<f64>,
}

impl Default for LowPass {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHT)
    }
}

impl LowPass {
    pub fn new(weight: u32) -> Self {
        Self {
            weight: f64::from(weight),
            prev: None,
        }
    }

    pub fn apply(&mut self, x: f64) -> f64 {
        let y = match self.prev {
            Some(prev) => (x + prev * self.weight) / (self.weight + 1.0),
            None => x,
        };
        self.prev = Some(y);
        y
    }

    pub fn last(&self) -> Option<f64> {
        self.prev
    }

    pub fn reset(&mut self) {
        self.prev = None;
    }
}
