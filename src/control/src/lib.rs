#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod config;
mod curve;
mod error;
mod smoothing;
mod state;
mod store;

use log::*;

pub use config::{CurveConfig, PumpLimits, K1_MAX, K2_MAX, SMOOTHING_WINDOW};
pub use curve::{demanded_power, frequency_for_power, round_hundredths};
pub use error::ControlError;
pub use smoothing::FrequencyFilter;
pub use state::{Coefficients, Frequency, PumpControl, Temperature};
pub use store::{decode, encode, MemoryStore, ParameterStore, StoredCoefficients};

fn check_reading(reading: Temperature) -> Result<f64, ControlError> {
    let value = f64::from(reading);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ControlError::InvalidReading(value))
    }
}

/// Adaptive heating curve driving the fuel pump frequency.
///
/// Coefficients live in the injected [`ParameterStore`] across restarts. The
/// smoothing history and the applied output only live as long as the
/// controller. No locking is done; callers sharing an instance across
/// threads must serialise access themselves.
#[derive(Debug)]
pub struct CurveController<S: ParameterStore> {
    config: CurveConfig,
    coefficients: Coefficients,
    filter: FrequencyFilter,
    store: S,
}

impl<S: ParameterStore> CurveController<S> {
    pub fn new(config: CurveConfig, mut store: S) -> Result<Self, ControlError> {
        config.validate()?;

        let defaults = Coefficients::new(config.initial_k1, config.initial_k2);
        let coefficients = match store.load() {
            Ok(Some(stored)) => {
                let coefficients = stored.resolve(defaults).saturated();
                info!(
                    "Loaded heating curve k1={:.3} k2={:.3}",
                    coefficients.k1, coefficients.k2
                );
                coefficients
            }
            Ok(None) => {
                info!("No stored heating curve, starting from defaults");
                defaults.saturated()
            }
            Err(e) => {
                warn!("Unable to load heating curve, using defaults: {:?}", e);
                defaults.saturated()
            }
        };

        let filter = FrequencyFilter::new(
            Frequency::new(config.limits.frequency_min),
            config.limits.hysteresis,
        );

        Ok(CurveController {
            config,
            coefficients,
            filter,
            store,
        })
    }

    /// Adapt the curve coefficients to the indoor temperature error and store them.
    ///
    /// `_outdoor` is accepted for interface compatibility and currently unused.
    /// When storing fails the adapted coefficients stay in effect and
    /// [`ControlError::Persistence`] is returned.
    pub fn update_curve(
        &mut self,
        _outdoor: Temperature,
        indoor: Temperature,
    ) -> Result<(), ControlError> {
        let indoor = check_reading(indoor)?;
        let error = f64::from(self.config.target_temperature) - indoor;

        self.coefficients = self.coefficients.adapt(error, self.config.learning_rate);
        debug!(
            "Heating curve error {:.2}, k1={:.3} k2={:.3}",
            error, self.coefficients.k1, self.coefficients.k2
        );

        self.store.save(&self.coefficients).map_err(|e| {
            error!("Failed to store heating curve: {:?}", e);
            ControlError::Persistence(e)
        })
    }

    /// Next pump frequency, or [`PumpControl::Inactive`] during warm-up.
    ///
    /// Nothing is recorded while the heater is inactive.
    pub fn compute_frequency(
        &mut self,
        outdoor: Temperature,
        heater_active: bool,
    ) -> Result<PumpControl, ControlError> {
        if !heater_active {
            return Ok(PumpControl::Inactive);
        }
        check_reading(outdoor)?;

        let limits = &self.config.limits;
        let power = demanded_power(
            &self.coefficients,
            limits,
            self.config.target_temperature,
            outdoor,
        );
        let candidate = frequency_for_power(limits, power);
        debug!("Demanded power {:.1} W, candidate {:?}", power, candidate);

        let applied = self.filter.push(candidate);

        Ok(PumpControl::Frequency(Frequency::new(round_hundredths(
            f64::from(applied),
        ))))
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    pub fn last_applied_frequency(&self) -> Frequency {
        self.filter.last_applied()
    }

    pub fn smoothing_history(&self) -> impl Iterator<Item = Frequency> + '_ {
        self.filter.history()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::vec::Vec;

    struct FailingStore;

    impl ParameterStore for FailingStore {
        fn load(&mut self) -> anyhow::Result<Option<StoredCoefficients>> {
            Err(anyhow!("disk unavailable"))
        }

        fn save(&mut self, _coefficients: &Coefficients) -> anyhow::Result<()> {
            Err(anyhow!("disk unavailable"))
        }
    }

    fn config(target: f64) -> CurveConfig {
        CurveConfig {
            target_temperature: Temperature::new(target),
            ..CurveConfig::default()
        }
    }

    fn history(controller: &CurveController<impl ParameterStore>) -> Vec<f64> {
        controller.smoothing_history().map(f64::from).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn test_example_scenario() {
        let mut controller = CurveController::new(config(22.0), MemoryStore::new()).unwrap();

        controller
            .update_curve(Temperature::new(-5.0), Temperature::new(18.0))
            .unwrap();
        let coefficients = controller.coefficients();
        assert_close(coefficients.k1, 10.4);
        assert_close(coefficients.k2, 30.2);

        let result = controller
            .compute_frequency(Temperature::new(-5.0), true)
            .unwrap();
        assert_eq!(result, PumpControl::Frequency(Frequency::new(1.4)));
        assert_eq!(history(&controller), [1.4]);
    }

    #[test]
    fn test_update_is_stored() {
        let mut controller = CurveController::new(config(22.0), MemoryStore::new()).unwrap();
        controller
            .update_curve(Temperature::new(0.0), Temperature::new(21.0))
            .unwrap();

        let stored = decode(controller.store().bytes().unwrap()).unwrap();
        assert_eq!(stored, StoredCoefficients::from(controller.coefficients()));
    }

    #[test]
    fn test_loads_stored_coefficients() {
        let store = MemoryStore::from_bytes(br#"{"k1": 15.0, "k2": 45.0}"#);
        let controller = CurveController::new(CurveConfig::default(), store).unwrap();
        assert_eq!(controller.coefficients(), Coefficients::new(15.0, 45.0));
    }

    #[test]
    fn test_malformed_store_uses_defaults() {
        let store = MemoryStore::from_bytes(b"not json");
        let controller = CurveController::new(CurveConfig::default(), store).unwrap();
        assert_eq!(controller.coefficients(), Coefficients::new(10.0, 30.0));
    }

    #[test]
    fn test_out_of_range_store_is_saturated() {
        let store = MemoryStore::from_bytes(br#"{"k1": 35.0, "k2": -4.0}"#);
        let controller = CurveController::new(CurveConfig::default(), store).unwrap();
        assert_eq!(controller.coefficients(), Coefficients::new(K1_MAX, 0.0));
    }

    #[test]
    fn test_failed_load_uses_defaults() {
        let controller = CurveController::new(CurveConfig::default(), FailingStore).unwrap();
        assert_eq!(controller.coefficients(), Coefficients::new(10.0, 30.0));
    }

    #[test]
    fn test_failed_save_keeps_update() {
        let mut controller = CurveController::new(config(22.0), FailingStore).unwrap();
        let result = controller.update_curve(Temperature::new(-5.0), Temperature::new(18.0));

        assert!(matches!(result, Err(ControlError::Persistence(_))));
        assert_close(controller.coefficients().k1, 10.4);
        assert_close(controller.coefficients().k2, 30.2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CurveConfig {
            limits: PumpLimits {
                power_min: 4300.0,
                ..PumpLimits::default()
            },
            ..CurveConfig::default()
        };
        let result = CurveController::new(config, MemoryStore::new());
        assert!(matches!(result, Err(ControlError::Configuration(_))));
    }

    #[test]
    fn test_non_finite_indoor_rejected() {
        let mut controller = CurveController::new(config(22.0), MemoryStore::new()).unwrap();
        let result = controller.update_curve(Temperature::new(0.0), Temperature::new(f64::NAN));

        assert!(matches!(result, Err(ControlError::InvalidReading(_))));
        assert_eq!(controller.coefficients(), Coefficients::new(10.0, 30.0));
        assert_eq!(controller.store().bytes(), None);
    }

    #[test]
    fn test_non_finite_outdoor_rejected() {
        let mut controller = CurveController::new(config(22.0), MemoryStore::new()).unwrap();
        let result = controller.compute_frequency(Temperature::new(f64::NEG_INFINITY), true);

        assert!(matches!(result, Err(ControlError::InvalidReading(_))));
        assert!(history(&controller).is_empty());
    }

    #[test]
    fn test_warm_up_leaves_state_alone() {
        let store = MemoryStore::from_bytes(br#"{"k1": 20.0, "k2": 50.0}"#);
        let mut controller = CurveController::new(config(22.0), store).unwrap();

        let first = controller
            .compute_frequency(Temperature::new(-80.0), true)
            .unwrap();
        let before = history(&controller);

        for outdoor in [-300.0, 40.0, f64::NAN] {
            let result = controller
                .compute_frequency(Temperature::new(outdoor), false)
                .unwrap();
            assert_eq!(result, PumpControl::Inactive);
            assert_eq!(result.frequency(), None);
        }
        assert_eq!(history(&controller), before);
        assert_eq!(
            first.frequency(),
            Some(controller.last_applied_frequency())
        );
    }

    #[test]
    fn test_cold_weather_drives_pump_up() {
        let store = MemoryStore::from_bytes(br#"{"k1": 20.0, "k2": 50.0}"#);
        let mut controller = CurveController::new(config(22.0), store).unwrap();

        // 20 * 102 + 50 = 2090 W
        let result = controller
            .compute_frequency(Temperature::new(-80.0), true)
            .unwrap();
        let frequency = f64::from(result.frequency().unwrap());
        assert_close(frequency, 2.67);
    }

    #[test]
    fn test_hysteresis_holds_output() {
        let store = MemoryStore::from_bytes(br#"{"k1": 20.0, "k2": 50.0}"#);
        let mut controller = CurveController::new(config(22.0), store).unwrap();

        let first = controller
            .compute_frequency(Temperature::new(-80.0), true)
            .unwrap();
        // 20 * 104 + 50 = 2130 W, averaging to well under 0.2 Hz of change
        let second = controller
            .compute_frequency(Temperature::new(-82.0), true)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_hysteresis_boundary_is_inclusive() {
        let store = MemoryStore::from_bytes(br#"{"k1": 20.0, "k2": 50.0}"#);
        let mut controller = CurveController::new(config(22.0), store).unwrap();

        // 4490 W is capped to the top of the range
        let first = controller
            .compute_frequency(Temperature::new(-200.0), true)
            .unwrap();
        assert_eq!(first, PumpControl::Frequency(Frequency::new(5.5)));

        // 3990 W maps to 5.1 Hz, averaging to 5.3 Hz
        let second = controller
            .compute_frequency(Temperature::new(-175.0), true)
            .unwrap();
        assert_eq!(history(&controller), [5.5, 5.1]);
        assert_eq!(second, PumpControl::Frequency(Frequency::new(5.3)));
    }

    #[test]
    fn test_output_rounds_exact_average() {
        let store = MemoryStore::from_bytes(br#"{"k1": 20.0, "k2": 50.0}"#);
        let mut controller = CurveController::new(config(22.0), store).unwrap();

        controller
            .compute_frequency(Temperature::new(-200.0), true)
            .unwrap();
        // 3890 W maps to 4.97 Hz; the average lands just under 5.235 Hz
        let result = controller
            .compute_frequency(Temperature::new(-170.0), true)
            .unwrap();
        assert_eq!(f64::from(controller.last_applied_frequency()), (5.5 + 4.97) / 2.0);
        assert_eq!(result, PumpControl::Frequency(Frequency::new(5.23)));
    }

    #[test]
    fn test_reconstruction_resets_smoothing() {
        let store = MemoryStore::from_bytes(br#"{"k1": 20.0, "k2": 50.0}"#);
        let mut controller = CurveController::new(config(22.0), store).unwrap();
        controller
            .compute_frequency(Temperature::new(-80.0), true)
            .unwrap();
        controller
            .update_curve(Temperature::new(-80.0), Temperature::new(22.0))
            .unwrap();

        let controller = CurveController::new(config(22.0), controller.into_store()).unwrap();
        assert!(history(&controller).is_empty());
        assert_eq!(controller.last_applied_frequency(), Frequency::new(1.4));
        assert_eq!(controller.coefficients(), Coefficients::new(20.0, 50.0));
    }
}
