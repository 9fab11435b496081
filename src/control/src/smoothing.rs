use heapless::Deque;
use log::*;

use crate::config::SMOOTHING_WINDOW;
use crate::state::Frequency;

/// Moving average over the last few candidate frequencies, followed by a
/// hysteresis gate on the applied output.
#[derive(Debug, Clone)]
pub struct FrequencyFilter {
    history: Deque<f64, SMOOTHING_WINDOW>,
    hysteresis: f64,
    last_applied: f64,
}

impl FrequencyFilter {
    pub fn new(initial: Frequency, hysteresis: f64) -> Self {
        Self {
            history: Deque::new(),
            hysteresis,
            last_applied: f64::from(initial),
        }
    }

    /// Feed one candidate frequency and return the (unrounded) applied output.
    pub fn push(&mut self, candidate: Frequency) -> Frequency {
        if self.history.is_full() {
            self.history.pop_front();
        }
        // Cannot fail, a slot was freed above
        let _ = self.history.push_back(f64::from(candidate));

        let average = self.history.iter().sum::<f64>() / self.history.len() as f64;

        if libm::fabs(average - self.last_applied) >= self.hysteresis {
            debug!(
                "Averaged frequency moved {:.2} -> {:.2} Hz",
                self.last_applied, average
            );
            self.last_applied = average;
        } else {
            debug!(
                "Holding {:.2} Hz, average {:.2} Hz is inside hysteresis",
                self.last_applied, average
            );
        }

        Frequency::new(self.last_applied)
    }

    pub fn history(&self) -> impl Iterator<Item = Frequency> + '_ {
        self.history.iter().map(|value| Frequency::new(*value))
    }

    pub fn last_applied(&self) -> Frequency {
        Frequency::new(self.last_applied)
    }
}
