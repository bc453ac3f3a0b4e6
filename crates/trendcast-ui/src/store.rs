//! Persists the last shown background index between launches.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct RotationState {
    last_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct RotationStore {
    path: PathBuf,
}

impl RotationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last saved index. A missing or unreadable file yields `None`.
    pub fn load(&self) -> Option<usize> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<RotationState>(&contents) {
            Ok(state) => state.last_index,
            Err(e) => {
                tracing::warn!("Ignoring corrupt rotation state: {}", e);
                None
            }
        }
    }

    pub fn save(&self, last_index: Option<usize>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&RotationState { last_index })?;
        std::fs::write(&self.path, json)
    }
}
