use core::fmt;

#[derive(Debug)]
pub enum ControlError {
    /// A temperature reading was NaN or infinite.
    InvalidReading(f64),
    /// The controller was constructed with unusable settings.
    Configuration(&'static str),
    /// Coefficients were updated in memory but could not be stored.
    Persistence(anyhow::Error),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidReading(value) => write!(f, "invalid temperature reading: {value}"),
            Self::Configuration(msg) => write!(f, "invalid configuration: {msg}"),
            Self::Persistence(e) => write!(f, "failed to persist coefficients: {e}"),
        }
    }
}

impl core::error::Error for ControlError {}
