// Write token storage.
// A token is kept for the current process and, when remembered, in the user's config directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{ContentError, Result};

/// Default location of the remembered token (~/.config/sitecontent/token on Linux).
pub fn token_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sitecontent").map(|dirs| dirs.config_dir().join("token"))
}

/// Session and remembered repository tokens.
#[derive(Debug, Default)]
pub struct TokenStore {
    path: Option<PathBuf>,
    session: Option<String>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self {
            path: token_path(),
            session: None,
        }
    }

    /// Store remembered tokens at an explicit path.
    pub fn at(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            session: None,
        }
    }

    /// Keep a token for this process and optionally remember it on disk.
    pub fn save(&mut self, token: &str, remember: bool) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ContentError::Validation("token is empty".to_string()));
        }

        if remember {
            let path = self
                .path
                .as_deref()
                .ok_or_else(|| ContentError::Other("no config directory available".to_string()))?;
            write_private(path, token)?;
        }
        self.session = Some(token.to_string());
        Ok(())
    }

    /// Session token first, then the remembered one.
    pub fn load(&self) -> Result<Option<String>> {
        if let Some(token) = &self.session {
            return Ok(Some(token.clone()));
        }
        let Some(path) = self.path.as_deref() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let token = fs::read_to_string(path)?.trim().to_string();
        Ok((!token.is_empty()).then_some(token))
    }

    /// Drop both the session and the remembered token.
    pub fn forget(&mut self) -> Result<()> {
        self.session = None;
        if let Some(path) = self.path.as_deref() {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// Write atomically via temp file, readable by the owner only.
fn write_private(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(token.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}
