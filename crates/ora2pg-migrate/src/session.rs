//! Authenticated session holder.
//!
//! A [`Session`] is created once and shared (`Arc<Session>`) with every
//! [`crate::api::ApiClient`] that needs it. It optionally mirrors itself to a
//! JSON file so the CLI stays logged in between invocations.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Account role on the migration server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// Bearer token plus the user it belongs to.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Shared, optionally file-backed authentication state.
pub struct Session {
    path: Option<PathBuf>,
    state: RwLock<Option<AuthSession>>,
}

impl Session {
    /// A session that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(None),
        }
    }

    /// Load the session persisted at `path`, if any.
    ///
    /// A missing file means "logged out". An unreadable or corrupt file is
    /// logged and treated the same way rather than failing startup.
    pub fn hydrate<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<AuthSession>(&content) {
                Ok(auth) => {
                    debug!("Restored session for {} from {}", auth.user.email, path.display());
                    Some(auth)
                }
                Err(e) => {
                    warn!("Ignoring corrupt session file {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Could not read session file {}: {}", path.display(), e);
                None
            }
        };

        Self {
            path: Some(path),
            state: RwLock::new(state),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Store a fresh login and persist it.
    pub fn establish(&self, token: impl Into<String>, user: User) -> Result<()> {
        let auth = AuthSession {
            token: token.into(),
            user,
        };
        if let Some(path) = &self.path {
            write_atomic(path, &serde_json::to_string_pretty(&auth)?)?;
        }
        *self.write() = Some(auth);
        Ok(())
    }

    /// Forget the login (logout or a 401 from the server).
    pub fn clear(&self) -> Result<()> {
        *self.write() = None;
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed session file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|a| a.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.read().as_ref().map(|a| a.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<AuthSession>> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<AuthSession>> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("path", &self.path)
            .field("state", &*self.read())
            .finish()
    }
}

/// Write to a temp file next to `path`, then rename over it.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user() -> User {
        User {
            id: "u1".into(),
            email: "ada@example.com".into(),
            name: "Ada".into(),
            avatar: None,
            role: UserRole::Admin,
            created_at: None,
        }
    }

    #[test]
    fn test_in_memory_lifecycle() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated());
        session.establish("tok", user()).unwrap();
        assert_eq!(session.token().as_deref(), Some("tok"));
        assert_eq!(session.user().unwrap().role, UserRole::Admin);
        session.clear().unwrap();
        assert!(session.token().is_none());
        assert!(session.path().is_none());
    }

    #[test]
    fn test_hydrate_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let session = Session::hydrate(&path);
        assert!(!session.is_authenticated());
        session.establish("secret-token", user()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let restored = Session::hydrate(&path);
        assert_eq!(restored.token().as_deref(), Some("secret-token"));
        assert_eq!(restored.user().unwrap().email, "ada@example.com");

        restored.clear().unwrap();
        assert!(!path.exists());
        // Clearing twice is fine.
        restored.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let session = Session::hydrate(&path);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::in_memory();
        session.establish("very-secret", user()).unwrap();
        let debug = format!("{:?}", session);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
