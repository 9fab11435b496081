use anyhow::Result;
use log::*;
use std::io::{self, BufRead, Write};

mod config;
mod heating;
mod measurement;
mod store;

use config::Config;
use control::{ControlError, CurveController, MemoryStore, ParameterStore};
use heating::{PumpChange, PumpOutput};
use measurement::Measurement;
use store::JsonFileStore;

fn open_store(config: &Config) -> Box<dyn ParameterStore> {
    match &config.param_file {
        Some(path) => {
            let store = JsonFileStore::new(path);
            info!("Storing heating curve in {}", store.path().display());
            Box::new(store)
        }
        None => {
            warn!("No parameter file configured, heating curve will not survive a restart");
            Box::new(MemoryStore::new())
        }
    }
}

/// Adapt the curve to one measurement and work out the next pump command.
fn handle_measurement<S: ParameterStore>(
    controller: &mut CurveController<S>,
    output: &mut PumpOutput,
    measurement: &Measurement,
) -> Option<PumpChange> {
    match controller.update_curve(measurement.outdoor, measurement.indoor) {
        Ok(()) => {}
        // The heater keeps running on the adapted in-memory curve
        Err(ControlError::Persistence(_)) => {}
        // The pump command only depends on the outdoor reading
        Err(e) => warn!("Not adapting heating curve: {}", e),
    }

    match controller.compute_frequency(measurement.outdoor, measurement.heater_active) {
        Ok(control) => Some(output.apply(control)),
        Err(e) => {
            warn!("No pump command for this measurement: {}", e);
            None
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::read();
    let store = open_store(&config);
    let mut controller = CurveController::new(config.curve, store)?;
    let mut output = PumpOutput::default();

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    // One measurement per line: "<outdoor> <indoor> <heater active>"
    for line in stdin.lock().lines() {
        let line = line?;
        let measurement = match Measurement::parse_line(&line) {
            Ok(Some(measurement)) => measurement,
            Ok(None) => continue,
            Err(e) => {
                warn!("Ignoring input {:?}: {:?}", line, e);
                continue;
            }
        };
        debug!("Received measurement {:?}", measurement);

        if let Some(change) = handle_measurement(&mut controller, &mut output, &measurement) {
            writeln!(stdout, "{}", change)?;
        }
    }

    Ok(())
}
