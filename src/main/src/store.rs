use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use control::{Coefficients, ParameterStore, StoredCoefficients};

/// Heating curve coefficients kept in a small JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Written first, then renamed over the real file
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ParameterStore for JsonFileStore {
    fn load(&mut self) -> Result<Option<StoredCoefficients>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        let stored = control::decode(&bytes)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Some(stored))
    }

    fn save(&mut self, coefficients: &Coefficients) -> Result<()> {
        let bytes = control::encode(coefficients)?;
        let staging = self.staging_path();

        fs::write(&staging, bytes).with_context(|| format!("writing {}", staging.display()))?;
        fs::rename(&staging, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}
