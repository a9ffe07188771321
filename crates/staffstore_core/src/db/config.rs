//! Caller-owned connection parameters.

use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

/// Connection parameters for one store/adapter instance.
///
/// Two instances built from different configs never share state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub location: DbLocation,
    pub busy_timeout: Duration,
}

impl DbConfig {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            location: DbLocation::File(path.as_ref().to_path_buf()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::Memory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub(crate) fn mode(&self) -> &'static str {
        match self.location {
            DbLocation::File(_) => "file",
            DbLocation::Memory => "memory",
        }
    }
}
