//! Persistence of finished sessions.
//!
//! The JSON store keeps every saved [`GameSession`] in one array. Saving
//! reads the array, appends and rewrites the file.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use satama_core::{GameSession, UserId};
use tracing::{debug, info, instrument};

use crate::error::StoreError;

/// Destination for finished sessions.
pub trait ResultStore {
    /// Saves one finished session.
    fn persist(&self, session: &GameSession) -> Result<(), StoreError>;

    /// All saved sessions, oldest first.
    fn load_all(&self) -> Result<Vec<GameSession>, StoreError>;

    /// Saved sessions of one player, oldest first.
    fn load_for(&self, player: &UserId) -> Result<Vec<GameSession>, StoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|s| s.player().as_ref() == Some(player))
            .collect())
    }
}

impl<T: ResultStore + ?Sized> ResultStore for Arc<T> {
    fn persist(&self, session: &GameSession) -> Result<(), StoreError> {
        (**self).persist(session)
    }

    fn load_all(&self) -> Result<Vec<GameSession>, StoreError> {
        (**self).load_all()
    }
}

/// Sessions saved to a JSON file.
#[derive(Debug, Clone)]
pub struct JsonResultStore {
    path: PathBuf,
}

impl JsonResultStore {
    /// Creates a store writing to `path`; the file is created on first save.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn new(path: impl AsRef<Path>) -> Self {
        info!("Creating JsonResultStore");
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the results file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultStore for JsonResultStore {
    #[instrument(skip(self, session), fields(session_id = %session.id(), path = %self.path.display()))]
    fn persist(&self, session: &GameSession) -> Result<(), StoreError> {
        let mut sessions = self.load_all()?;
        sessions.push(session.clone());

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &sessions)?;
        writer.flush()?;

        info!(saved = sessions.len(), "Session saved");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load_all(&self) -> Result<Vec<GameSession>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No results file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let sessions: Vec<GameSession> = serde_json::from_reader(BufReader::new(file))?;
        debug!(count = sessions.len(), "Sessions loaded");
        Ok(sessions)
    }
}

/// Sessions kept in memory.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    sessions: Mutex<Vec<GameSession>>,
    unavailable: bool,
}

impl MemoryResultStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose saves always fail.
    pub fn unavailable() -> Self {
        Self {
            sessions: Mutex::default(),
            unavailable: true,
        }
    }

    /// Number of saved sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing was saved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultStore for MemoryResultStore {
    fn persist(&self, session: &GameSession) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::new("Result store is unavailable"));
        }
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(session.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<GameSession>, StoreError> {
        Ok(self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
