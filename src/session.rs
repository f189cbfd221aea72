use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Explicit session context: the persisted bearer token and the signed-in
/// user's display name. Loaded once at startup and passed to whatever needs
/// it; cleared on logout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user_name: Option<String>,
}

impl Session {
    fn path() -> PathBuf {
        // XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobtrack") {
            proj_dirs.data_dir().join("session.json")
        } else {
            PathBuf::from("session.json")
        }
    }

    /// A missing file means no session yet, not an error.
    pub fn load() -> Result<Self> {
        let path = Self::path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt session file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write session file: {}", path.display()))
    }

    /// Teardown on logout.
    pub fn clear() -> Result<()> {
        let path = Self::path();
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove session file: {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_round_trip() {
        let session = Session {
            token: Some("abc.def.ghi".to_string()),
            user_name: Some("Sam".to_string()),
        };
        let raw = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.token.as_deref(), Some("abc.def.ghi"));
        assert_eq!(back.user_name.as_deref(), Some("Sam"));
    }

    #[test]
    fn test_default_session_is_anonymous() {
        let session = Session::default();
        assert!(session.token.is_none());
        assert!(session.user_name.is_none());
    }
}
