//! # Host Collaborator
//!
//! The application being saved is reached only through [`Host`]: one capture
//! operation and two restore capabilities.
//!
//! - **Native replay** brings the application back to the saved position through
//!   its own mechanism. It is preferred whenever available.
//! - **Direct injection** writes the state into the application's persistence and
//!   triggers a full reload. It is the fallback.
//!
//! At least one capability must be available for a load to succeed.

use crate::error::HostError;
use crate::model::CapturedState;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

#[async_trait]
pub trait Host: Send + Sync {
    /// Snapshot the complete current progress. Fails with [`HostError::NoState`]
    /// when there is no safe capture point yet.
    fn capture_state(&self) -> Result<CapturedState, HostError>;

    fn can_replay(&self) -> bool;

    fn can_inject(&self) -> bool;

    async fn replay(&self, state: &Value) -> Result<(), HostError>;

    async fn inject_and_reload(&self, state: &Value) -> Result<(), HostError>;
}

/// Which restore path brought the state back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePath {
    Replayed,
    Injected,
}

/// Host whose state lives in a JSON file on disk.
///
/// Capturing reads the file; a top-level `"scene"` string, when present, becomes
/// the save's scene label. Restoring rewrites the file atomically. There is no
/// native replay.
pub struct StateFileHost {
    path: PathBuf,
}

impl StateFileHost {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Host for StateFileHost {
    fn capture_state(&self) -> Result<CapturedState, HostError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(HostError::NoState),
            Err(e) => return Err(HostError::Failed(e.to_string())),
        };
        if content.trim().is_empty() {
            return Err(HostError::NoState);
        }
        let state: Value = serde_json::from_str(&content)
            .map_err(|e| HostError::Failed(format!("state file is not JSON: {}", e)))?;
        let scene = state
            .get("scene")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(CapturedState { state, scene })
    }

    fn can_replay(&self) -> bool {
        false
    }

    fn can_inject(&self) -> bool {
        true
    }

    async fn replay(&self, _state: &Value) -> Result<(), HostError> {
        Err(HostError::Unsupported("native replay"))
    }

    async fn inject_and_reload(&self, state: &Value) -> Result<(), HostError> {
        let content =
            serde_json::to_string_pretty(state).map_err(|e| HostError::Failed(e.to_string()))?;
        let dir = self
            .path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let tmp = dir.join(format!(".state-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content)
            .await
            .map_err(|e| HostError::Failed(e.to_string()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| HostError::Failed(e.to_string()))?;
        info!(path = %self.path.display(), "state injected");
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Scriptable host that records every restore it is asked to perform.
    #[derive(Default)]
    pub struct MockHost {
        pub current: Mutex<Option<CapturedState>>,
        pub replay_available: bool,
        pub inject_available: bool,
        pub replay_fails: bool,
        pub inject_fails: bool,
        pub restored: Mutex<Vec<(RestorePath, Value)>>,
    }

    impl MockHost {
        /// Host with both capabilities and nothing captured yet.
        pub fn new() -> Self {
            Self {
                replay_available: true,
                inject_available: true,
                ..Self::default()
            }
        }

        pub fn with_state(self, state: Value, scene: &str) -> Self {
            self.set_state(state, scene);
            self
        }

        pub fn set_state(&self, state: Value, scene: &str) {
            *self.current.lock().unwrap() = Some(CapturedState::new(state, scene));
        }

        pub fn restored(&self) -> Vec<(RestorePath, Value)> {
            self.restored.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Host for MockHost {
        fn capture_state(&self) -> Result<CapturedState, HostError> {
            self.current.lock().unwrap().clone().ok_or(HostError::NoState)
        }

        fn can_replay(&self) -> bool {
            self.replay_available
        }

        fn can_inject(&self) -> bool {
            self.inject_available
        }

        async fn replay(&self, state: &Value) -> Result<(), HostError> {
            if self.replay_fails {
                return Err(HostError::Failed("replay hook missing".into()));
            }
            self.restored
                .lock()
                .unwrap()
                .push((RestorePath::Replayed, state.clone()));
            Ok(())
        }

        async fn inject_and_reload(&self, state: &Value) -> Result<(), HostError> {
            if self.inject_fails {
                return Err(HostError::Failed("injection failed".into()));
            }
            self.restored
                .lock()
                .unwrap()
                .push((RestorePath::Injected, state.clone()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn missing_state_file_means_nothing_to_capture() {
        let dir = TempDir::new().unwrap();
        let host = StateFileHost::new(dir.path().join("state.json"));
        assert_eq!(host.capture_state().unwrap_err(), HostError::NoState);
    }

    #[test]
    fn capture_reads_scene_label() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"scene": "Docks", "turn": 4}"#).unwrap();

        let captured = StateFileHost::new(&path).capture_state().unwrap();
        assert_eq!(captured.scene, "Docks");
        assert_eq!(captured.state["turn"], 4);
    }

    #[tokio::test]
    async fn inject_rewrites_the_state_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let host = StateFileHost::new(&path);

        host.inject_and_reload(&json!({"turn": 9})).await.unwrap();
        assert_eq!(host.capture_state().unwrap().state, json!({"turn": 9}));
        assert!(host.replay(&json!({})).await.is_err());
    }
}
