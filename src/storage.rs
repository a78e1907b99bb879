//! Warm-start cache for the last applied session.
//!
//! Lets a display show the signed-in user's previous balance until the first
//! reconciliation completes. The file is a convenience only: it is never
//! consulted for reservations, and a missing or corrupt file reads as "no
//! cache".

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::models::UserSession;

/// JSON file holding the most recently applied [`UserSession`].
#[derive(Debug, Clone)]
pub struct BalanceCache {
    path: PathBuf,
}

/// `~/.credit-sync/last_session.json`, or `None` without a home directory.
pub fn default_cache_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".credit-sync").join("last_session.json"))
}

impl BalanceCache {

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached session, if there is a readable one.
    pub fn load(&self) -> Option<UserSession> {
        let file = File::open(&self.path).ok()?;
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!("Ignoring unreadable balance cache {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Write the session. Returns false on any I/O or encoding failure.
    pub fn save(&self, session: &UserSession) -> bool {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() && fs::create_dir_all(parent).is_err() {
                return false;
            }
        }

        let file = match File::create(&self.path) {
            Ok(f) => f,
            Err(_) => return false,
        };

        let mut writer = BufWriter::new(file);
        if serde_json::to_writer_pretty(&mut writer, session).is_err() {
            return false;
        }

        writer.flush().is_ok()
    }

    /// Remove the cache file. Missing files count as cleared.
    pub fn clear(&self) -> bool {
        match fs::remove_file(&self.path) {
            Ok(()) => true,
            Err(e) => e.kind() == std::io::ErrorKind::NotFound,
        }
    }
}
