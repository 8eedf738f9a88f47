// File: ./src/session.rs
//! Bearer token storage.
//!
//! The token is the only piece of client state that survives a restart.
//! Everything that needs it (the HTTP middleware and the route guard)
//! holds a [`SharedSession`] handle instead of reading a global.
use crate::context::AppContext;
use crate::storage::DiskStore;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub trait SessionStore: Send + Sync + fmt::Debug {
    /// The stored token. An empty token counts as no token.
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str) -> Result<()>;
    /// Idempotent.
    fn clear(&self) -> Result<()>;

    fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }
}

pub type SharedSession = Arc<dyn SessionStore>;

fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

// On-disk shape: `{ "token": "..." }`
#[derive(Serialize, Deserialize, Default)]
struct PersistedSession {
    #[serde(default)]
    token: Option<String>,
}

/// Token persisted to `<data_dir>/session.json` and mirrored in memory.
pub struct FileSessionStore {
    path: PathBuf,
    token: Mutex<Option<String>>,
}

impl FileSessionStore {
    /// Opens the store, reading any token left by a previous run.
    /// An unreadable session file is treated as logged out.
    pub fn open(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_session_path()?;
        let token = match DiskStore::read_json::<PersistedSession>(&path) {
            Ok(found) => non_empty(found.unwrap_or_default().token),
            Err(e) => {
                log::warn!("Ignoring unreadable session file: {:#}", e);
                None
            }
        };
        Ok(Self {
            path,
            token: Mutex::new(token),
        })
    }

    pub fn shared(ctx: &dyn AppContext) -> Result<SharedSession> {
        Ok(Arc::new(Self::open(ctx)?))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned lock still holds a valid Option<String>.
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for FileSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSessionStore")
            .field("path", &self.path)
            .field("authenticated", &self.lock().is_some())
            .finish()
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<String> {
        self.lock().clone()
    }

    fn set(&self, token: &str) -> Result<()> {
        let mut guard = self.lock();
        if token.is_empty() {
            DiskStore::remove(&self.path)?;
            *guard = None;
            return Ok(());
        }
        DiskStore::write_json(
            &self.path,
            &PersistedSession {
                token: Some(token.to_string()),
            },
        )?;
        *guard = Some(token.to_string());
        log::debug!("Session token stored");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self.lock();
        // Forget the in-memory token even if the file cannot be removed,
        // so the guard stops treating this process as logged in.
        *guard = None;
        DiskStore::remove(&self.path)?;
        log::debug!("Session cleared");
        Ok(())
    }
}

/// In-process token holder with no persistence.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(non_empty(Some(token.to_string()))),
        }
    }

    pub fn shared() -> SharedSession {
        Arc::new(Self::new())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<String> {
        self.token.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) =
            non_empty(Some(token.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
