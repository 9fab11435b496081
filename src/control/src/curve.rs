use crate::config::{PumpLimits, K1_MAX, K2_MAX};
use crate::state::{Coefficients, Frequency, Temperature};

/// Round to the nearest hundredth of the exact binary value, exact ties to even.
pub fn round_hundredths(value: f64) -> f64 {
    let scaled = value * 100.0;
    // Error of the multiplication above, exact thanks to the fused multiply-add
    let residual = libm::fma(value, 100.0, -scaled);
    let mut rounded = libm::round(scaled);

    let offset = scaled - rounded;
    if offset == 0.5 || offset == -0.5 {
        let (below, above) = if offset == 0.5 {
            (rounded, rounded + 1.0)
        } else {
            (rounded - 1.0, rounded)
        };
        rounded = if residual > 0.0 {
            above
        } else if residual < 0.0 {
            below
        } else if libm::fmod(below, 2.0) == 0.0 {
            below
        } else {
            above
        };
    }

    rounded / 100.0
}

// f64::max/min discard NaN, so a degenerate value saturates at the lower bound
fn saturate(value: f64, max: f64) -> f64 {
    value.max(0.0).min(max)
}

impl Coefficients {
    pub fn new(k1: f64, k2: f64) -> Self {
        Self { k1, k2 }
    }

    /// Clamp both coefficients into their stability bounds.
    pub fn saturated(self) -> Self {
        Self {
            k1: saturate(self.k1, K1_MAX),
            k2: saturate(self.k2, K2_MAX),
        }
    }

    /// One adaptation step towards removing `error` (target minus indoor).
    ///
    /// The offset moves at half the rate of the gain. Out-of-range results
    /// are truncated to the bound, not decayed.
    pub fn adapt(self, error: f64, learning_rate: f64) -> Self {
        Self {
            k1: self.k1 + learning_rate * error,
            k2: self.k2 + learning_rate * (error / 2.0),
        }
        .saturated()
    }
}

/// Heating power requested by the curve, limited to `[0, power_max]`.
pub fn demanded_power(
    coefficients: &Coefficients,
    limits: &PumpLimits,
    target: Temperature,
    outdoor: Temperature,
) -> f64 {
    let difference = f64::from(target) - f64::from(outdoor);
    let power = coefficients.k1 * difference + coefficients.k2;

    power.max(0.0).min(limits.power_max)
}

/// Map heating power linearly onto the pump frequency range.
///
/// Power below `power_min` is still mapped, landing under `frequency_min`
/// before the result is clamped back into range.
pub fn frequency_for_power(limits: &PumpLimits, power: f64) -> Frequency {
    let power_range = limits.power_max - limits.power_min;
    let frequency_range = limits.frequency_max - limits.frequency_min;

    let frequency =
        limits.frequency_min + (power - limits.power_min) / power_range * frequency_range;
    let frequency = frequency.min(limits.frequency_max).max(limits.frequency_min);

    Frequency::new(round_hundredths(frequency))
}
