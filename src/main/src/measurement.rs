use anyhow::{anyhow, bail, Context, Result};
use std::str::FromStr;

use control::Temperature;

/// One set of readings handed to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub outdoor: Temperature,
    pub indoor: Temperature,
    // Heater has finished warming up and follows the pump frequency
    pub heater_active: bool,
}

impl Measurement {
    /// Parse one input line, skipping blank lines and `#` comments.
    pub fn parse_line(line: &str) -> Result<Option<Measurement>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        line.parse().map(Some)
    }
}

fn parse_temperature(field: Option<&str>, name: &str) -> Result<Temperature> {
    let field = field.ok_or_else(|| anyhow!("missing {} temperature", name))?;
    let value: f64 = field
        .parse()
        .with_context(|| format!("{} temperature {:?}", name, field))?;
    Ok(Temperature::new(value))
}

fn parse_heater_state(field: Option<&str>) -> Result<bool> {
    let field = field.ok_or_else(|| anyhow!("missing heater state"))?;
    match field.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        other => bail!("unknown heater state {:?}", other),
    }
}

// "<outdoor> <indoor> <heater active>", whitespace or comma separated
impl FromStr for Measurement {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut fields = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|field| !field.is_empty());

        let outdoor = parse_temperature(fields.next(), "outdoor")?;
        let indoor = parse_temperature(fields.next(), "indoor")?;
        let heater_active = parse_heater_state(fields.next())?;

        if let Some(extra) = fields.next() {
            bail!("unexpected field {:?}", extra);
        }

        Ok(Measurement {
            outdoor,
            indoor,
            heater_active,
        })
    }
}
