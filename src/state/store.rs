//! JSON state file
//!
//! Writes go to a sibling temp file and are renamed into place, so a crash
//! mid-write leaves the previous state intact.

use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// On-disk representation of the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub ads_count: u32,
}

/// State file errors
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to access state file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse state file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode state: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("persisted ads count {value} is outside 0..={max}")]
    OutOfRange { value: u32, max: u32 },
}

/// Reads and writes the counter to a single JSON file
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    /// Largest value accepted on restore; also the random fallback bound
    max_value: u32,
    /// Serializes writers so concurrent saves never interleave
    write_lock: Mutex<()>,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>, max_value: u32) -> Self {
        Self {
            path: path.into(),
            max_value,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_value(&self) -> u32 {
        self.max_value
    }

    /// Read the persisted state, returning any failure
    pub fn load(&self) -> Result<PersistedState, StateError> {
        let contents = std::fs::read(&self.path).map_err(|source| StateError::Io {
            path: self.path.clone(),
            source,
        })?;

        let state: PersistedState =
            serde_json::from_slice(&contents).map_err(|source| StateError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if state.ads_count > self.max_value {
            return Err(StateError::OutOfRange {
                value: state.ads_count,
                max: self.max_value,
            });
        }

        Ok(state)
    }

    /// Restore the last persisted value.
    ///
    /// Never fails: any read or parse error yields a random value in
    /// `0..=max_value`.
    pub fn restore(&self) -> u32 {
        match self.load() {
            Ok(state) => {
                info!(path = ?self.path, ads_count = state.ads_count, "State restored");
                state.ads_count
            }
            Err(e) => {
                let fallback = rand::thread_rng().gen_range(0..=self.max_value);
                warn!(
                    error = %e,
                    ads_count = fallback,
                    "Failed to restore state, setting ads count to a random value"
                );
                fallback
            }
        }
    }

    /// Write `value` to the state file, returning any failure
    pub fn try_save(&self, value: u32) -> Result<(), StateError> {
        let body = serde_json::to_vec(&PersistedState { ads_count: value })
            .map_err(StateError::Encode)?;

        let _guard = self.write_lock.lock();

        let tmp_path = self.tmp_path();
        let io_err = |source| StateError::Io {
            path: tmp_path.clone(),
            source,
        };

        let mut file = std::fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(&body).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        std::fs::rename(&tmp_path, &self.path).map_err(|source| StateError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = ?self.path, ads_count = value, "State saved");
        Ok(())
    }

    /// Best-effort save; failures are logged and dropped
    pub fn save(&self, value: u32) {
        if let Err(e) = self.try_save(value) {
            error!(error = %e, ads_count = value, "Failed to save state");
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
