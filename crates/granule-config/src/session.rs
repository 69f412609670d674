//! Session persistence: a small TOML file next to the user's state.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::ConfigError;

/// Read a session, `Ok(None)` when none was saved yet.
pub fn load_session<T: DeserializeOwned>(session_path: &Path) -> Result<Option<T>, ConfigError> {
    if !session_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(session_path).map_err(|source| {
        ConfigError::SessionReadError {
            session_path: session_path.to_path_buf(),
            source,
        }
    })?;

    toml::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::SessionParseError {
            session_path: session_path.to_path_buf(),
            source,
        })
}

pub fn save_session<T: Serialize>(session_path: &Path, session: &T) -> anyhow::Result<()> {
    if let Some(parent) = session_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string(session)?;
    std::fs::write(session_path, content)?;
    Ok(())
}
