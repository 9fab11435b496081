use crate::error::ControlError;
use crate::state::Temperature;

pub const SMOOTHING_WINDOW: usize = 5;

pub const K1_MAX: f64 = 20.0;
pub const K2_MAX: f64 = 50.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PumpLimits {
    // Lowest drive frequency of the fuel pump, Hz
    pub frequency_min: f64,

    // Highest drive frequency of the fuel pump, Hz
    pub frequency_max: f64,

    // Heating power delivered at `frequency_min`, W
    pub power_min: f64,

    // Heating power delivered at `frequency_max`, W
    pub power_max: f64,

    // Smallest change of the averaged frequency that moves the output, Hz
    pub hysteresis: f64,
}

impl PumpLimits {
    pub fn validate(&self) -> Result<(), ControlError> {
        let values = [
            self.frequency_min,
            self.frequency_max,
            self.power_min,
            self.power_max,
            self.hysteresis,
        ];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(ControlError::Configuration("pump limits must be finite"));
        }
        if self.power_max <= self.power_min {
            return Err(ControlError::Configuration(
                "maximum power must be above minimum power",
            ));
        }
        if self.frequency_max <= self.frequency_min {
            return Err(ControlError::Configuration(
                "maximum frequency must be above minimum frequency",
            ));
        }
        if self.hysteresis < 0.0 {
            return Err(ControlError::Configuration("hysteresis must not be negative"));
        }
        Ok(())
    }
}

impl Default for PumpLimits {
    fn default() -> Self {
        PumpLimits {
            frequency_min: 1.4,
            frequency_max: 5.5,
            power_min: 1.1e3,
            power_max: 4.3e3,
            hysteresis: 0.2,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CurveConfig {
    // Desired indoor temperature
    pub target_temperature: Temperature,

    // Coefficients used when nothing has been stored yet
    pub initial_k1: f64,
    pub initial_k2: f64,

    // Step size of the coefficient adaptation
    pub learning_rate: f64,

    pub limits: PumpLimits,
}

impl CurveConfig {
    pub fn validate(&self) -> Result<(), ControlError> {
        if !f64::from(self.target_temperature).is_finite() {
            return Err(ControlError::Configuration("target temperature must be finite"));
        }
        if !self.learning_rate.is_finite() {
            return Err(ControlError::Configuration("learning rate must be finite"));
        }
        if !self.initial_k1.is_finite() || !self.initial_k2.is_finite() {
            return Err(ControlError::Configuration("initial coefficients must be finite"));
        }
        self.limits.validate()
    }
}

impl Default for CurveConfig {
    fn default() -> Self {
        CurveConfig {
            target_temperature: Temperature::new(20.0),
            initial_k1: 10.0,
            initial_k2: 30.0,
            learning_rate: 0.1,
            limits: PumpLimits::default(),
        }
    }
}
