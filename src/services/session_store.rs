use std::{
    fs, io,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};

use crate::{error::Result, models::Session};

/// Where the bearer token and user id live between requests.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;

    /// Like `load`, but an unreadable session is wiped and treated as
    /// logged out instead of failing the caller.
    fn load_or_reset(&self) -> Option<Session> {
        match self.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("discarding unreadable session: {}", e);
                if let Err(e) = self.clear() {
                    tracing::error!("failed to clear session: {}", e);
                }
                None
            }
        }
    }
}

/// JSON file on disk, the CLI's equivalent of browser local storage.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStorage for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let body = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, body)?;
        tracing::debug!("session saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("session file {} removed", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: RwLock::new(Some(session)),
        }
    }
}

impl SessionStorage for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok((*guard).clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
