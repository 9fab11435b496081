use std::path::PathBuf;

use control::{CurveConfig, PumpLimits, Temperature};

#[toml_cfg::toml_config]
#[derive(Copy, Clone, Debug)]
pub struct TomlConfig {
    #[default(20.0)]
    target_temperature: f64,
    #[default(10.0)]
    initial_k1: f64,
    #[default(30.0)]
    initial_k2: f64,
    #[default(0.1)]
    learning_rate: f64,
    #[default("heating_params.json")]
    param_file: &'static str,
}

pub struct Config {
    pub curve: CurveConfig,
    // None keeps the coefficients in memory only
    pub param_file: Option<PathBuf>,
}

impl Config {
    pub fn read() -> Self {
        Config::from(TOML_CONFIG)
    }
}

impl From<TomlConfig> for Config {
    fn from(config: TomlConfig) -> Self {
        let param_file = match config.param_file.trim() {
            "" => None,
            path => Some(PathBuf::from(path)),
        };
        Config {
            curve: CurveConfig {
                target_temperature: Temperature::new(config.target_temperature),
                initial_k1: config.initial_k1,
                initial_k2: config.initial_k2,
                learning_rate: config.learning_rate,
                limits: PumpLimits::default(),
            },
            param_file,
        }
    }
}
