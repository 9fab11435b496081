use log::*;
use std::fmt;

use control::{Frequency, PumpControl};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PumpChange {
    TakeControl(Frequency),
    Adjust { from: Frequency, to: Frequency },
    Hold(Frequency),
    ReleaseControl,
    WarmingUp,
}

/// Tracks what the pump was last told to do.
#[derive(Debug, Default)]
pub struct PumpOutput {
    current: Option<PumpControl>,
}

impl PumpOutput {
    pub fn apply(&mut self, next: PumpControl) -> PumpChange {
        let change = match (self.current, next) {
            (Some(PumpControl::Frequency(_)), PumpControl::Inactive) => {
                info!("Heater warming up, releasing pump control");
                PumpChange::ReleaseControl
            }
            (_, PumpControl::Inactive) => {
                debug!("Heater still warming up");
                PumpChange::WarmingUp
            }
            (Some(PumpControl::Frequency(from)), PumpControl::Frequency(to)) if from == to => {
                debug!("Pump is already at {:?}", to);
                PumpChange::Hold(to)
            }
            (Some(PumpControl::Frequency(from)), PumpControl::Frequency(to)) => {
                info!("Changing pump frequency from {:?} to {:?}", from, to);
                PumpChange::Adjust { from, to }
            }
            (_, PumpControl::Frequency(to)) => {
                info!("Taking control of pump at {:?}", to);
                PumpChange::TakeControl(to)
            }
        };
        self.current = Some(next);
        change
    }
}

impl fmt::Display for PumpChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TakeControl(to) => write!(f, "start {:.2} Hz", f64::from(*to)),
            Self::Adjust { from, to } => {
                write!(f, "{:.2} -> {:.2} Hz", f64::from(*from), f64::from(*to))
            }
            Self::Hold(at) => write!(f, "hold {:.2} Hz", f64::from(*at)),
            Self::ReleaseControl => write!(f, "release"),
            Self::WarmingUp => write!(f, "warm-up"),
        }
    }
}
