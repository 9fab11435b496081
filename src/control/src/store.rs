use alloc::boxed::Box;
use alloc::vec::Vec;
use anyhow::Result;
use serde::Deserialize;

use crate::state::Coefficients;

/// Durable home of the heating curve coefficients.
///
/// `load` returns `Ok(None)` when nothing has been stored yet, which is
/// distinct from a failed read.
pub trait ParameterStore {
    fn load(&mut self) -> Result<Option<StoredCoefficients>>;

    fn save(&mut self, coefficients: &Coefficients) -> Result<()>;
}

impl<S: ParameterStore + ?Sized> ParameterStore for Box<S> {
    fn load(&mut self) -> Result<Option<StoredCoefficients>> {
        (**self).load()
    }

    fn save(&mut self, coefficients: &Coefficients) -> Result<()> {
        (**self).save(coefficients)
    }
}

/// Coefficients as found in a store. Either key may be missing.
#[derive(Debug, PartialEq, Clone, Copy, Default, Deserialize)]
pub struct StoredCoefficients {
    #[serde(default)]
    pub k1: Option<f64>,
    #[serde(default)]
    pub k2: Option<f64>,
}

impl StoredCoefficients {
    /// Fill missing or non-finite values from `defaults`.
    pub fn resolve(&self, defaults: Coefficients) -> Coefficients {
        let pick = |stored: Option<f64>, default: f64| match stored {
            Some(value) if value.is_finite() => value,
            _ => default,
        };
        Coefficients {
            k1: pick(self.k1, defaults.k1),
            k2: pick(self.k2, defaults.k2),
        }
    }
}

impl From<Coefficients> for StoredCoefficients {
    fn from(coefficients: Coefficients) -> Self {
        StoredCoefficients {
            k1: Some(coefficients.k1),
            k2: Some(coefficients.k2),
        }
    }
}

pub fn encode(coefficients: &Coefficients) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(coefficients)?)
}

pub fn decode(bytes: &[u8]) -> Result<StoredCoefficients> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Store that keeps the encoded record in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Option<Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            record: Some(bytes.to_vec()),
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.record.as_deref()
    }
}

impl ParameterStore for MemoryStore {
    fn load(&mut self) -> Result<Option<StoredCoefficients>> {
        self.record.as_deref().map(decode).transpose()
    }

    fn save(&mut self, coefficients: &Coefficients) -> Result<()> {
        self.record = Some(encode(coefficients)?);
        Ok(())
    }
}
