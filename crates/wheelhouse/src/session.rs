use crate::notice::Notice;
use crate::state::WheelState;
use fs_err as fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access the working wheel: {0}")]
    Io(#[from] std::io::Error),
    #[error("Working wheel is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The working wheel shared by successive commands and the preview window.
#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_directory(directory: &Path) -> Self {
        Self::new(directory.join(SESSION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty wheel.
    pub fn open(&self) -> Result<WheelState, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(WheelState::from_json(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(WheelState::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Never fails: an unreadable session starts over empty, with a notice
    /// explaining why.
    pub fn open_or_default(&self) -> (WheelState, Option<Notice>) {
        match self.open() {
            Ok(state) => (state, None),
            Err(e) => {
                log::error!("{}: {}", self.path.display(), e);
                (
                    WheelState::default(),
                    Some(Notice::error(format!("{e}. Starting with a new wheel."))),
                )
            }
        }
    }

    pub fn commit(&self, state: &WheelState) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, state.to_json()?)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!(
            "Session updated: {} item(s) in {}",
            state.collection.len(),
            self.path.display()
        );
        Ok(())
    }
}
