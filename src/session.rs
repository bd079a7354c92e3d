//! Process-wide bearer credential, persisted across restarts.
//!
//! The credential is stored under a single well-known key (`jwt`) in
//! `~/.config/engagetui/session.json`. Every reader takes a fresh copy, so a
//! request issued after `set_credential` or `clear_credential` always sees
//! the new value while requests already in flight keep the one they started
//! with.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::config_dir;

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opaque bearer token issued by the backend after sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// On-disk shape of the session file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(default)]
    jwt: Option<String>,
}

pub fn session_path() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SESSION_FILE)
}

fn load_from(path: &Path) -> Result<Option<Credential>, SessionError> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)?;
    let data: PersistedSession = serde_json::from_str(&json)?;
    Ok(data.jwt.filter(|t| !t.is_empty()).map(Credential))
}

fn save_to(path: &Path, credential: Option<&Credential>) -> Result<(), SessionError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = PersistedSession {
        jwt: credential.map(|c| c.0.clone()),
    };
    std::fs::write(path, serde_json::to_string_pretty(&data)?)?;
    Ok(())
}

/// Shared handle to the current credential.
///
/// Cloning the store clones the handle, not the credential.
#[derive(Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Credential>>>,
    path: Option<PathBuf>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.current_credential().is_some())
            .field("path", &self.path)
            .finish()
    }
}

impl SessionStore {
    /// A store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store backed by `path`, loading any credential already there.
    ///
    /// An unreadable file is treated as an empty session.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match load_from(&path) {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable session file: {e}");
                None
            }
        };
        Self {
            current: Arc::new(RwLock::new(current)),
            path: Some(path),
        }
    }

    /// Open the store at the default location.
    pub fn open_default() -> Self {
        Self::open(session_path())
    }

    /// Replace the credential wholesale.
    pub fn set_credential(&self, credential: Credential) {
        self.persist(Some(&credential));
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(credential);
    }

    pub fn clear_credential(&self) {
        self.persist(None);
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn current_credential(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn persist(&self, credential: Option<&Credential>) {
        let Some(ref path) = self.path else {
            return;
        };
        if let Err(e) = save_to(path, credential) {
            tracing::warn!(path = %path.display(), "failed to persist session: {e}");
        }
    }
}
