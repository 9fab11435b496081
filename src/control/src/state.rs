use serde::Serialize;

// Temperature in degrees celcius
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
pub struct Temperature(f64);

impl Temperature {
    pub fn new(value: f64) -> Self {
        Self(value)
    }
}

impl From<Temperature> for f64 {
    fn from(value: Temperature) -> f64 {
        value.0
    }
}

// Fuel pump drive frequency in Hz
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
pub struct Frequency(f64);

impl Frequency {
    pub fn new(value: f64) -> Self {
        Self(value)
    }
}

impl From<Frequency> for f64 {
    fn from(value: Frequency) -> f64 {
        value.0
    }
}

/// Heating curve coefficients.
///
/// `k1` is the gain applied to the indoor/outdoor temperature difference,
/// `k2` the baseline power offset.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct Coefficients {
    pub k1: f64,
    pub k2: f64,
}

/// Result of a frequency computation.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PumpControl {
    // Heater is warming up; the pump is not under our control
    Inactive,
    Frequency(Frequency),
}

impl PumpControl {
    pub fn frequency(&self) -> Option<Frequency> {
        match self {
            PumpControl::Inactive => None,
            PumpControl::Frequency(frequency) => Some(*frequency),
        }
    }
}
