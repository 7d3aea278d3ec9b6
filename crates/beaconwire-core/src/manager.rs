//! Multi-board management.
//!
//! This module provides a manager for driving several boards from one
//! process. Boards share nothing: each keeps its own recorder, registry and
//! transport, so operations on different boards may run concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::board::{Board, BoardConfig};
use crate::error::{Error, Result};
use crate::transport::Transport;

/// Registry of named boards.
#[derive(Debug, Default)]
pub struct BoardManager {
    boards: RwLock<HashMap<String, Arc<Board>>>,
    config: BoardConfig,
}

impl BoardManager {
    /// Create a manager using the default board configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager whose [`BoardManager::connect`] uses `config`.
    pub fn with_config(config: BoardConfig) -> Self {
        Self {
            boards: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Register an existing board.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a board with the same name is
    /// already managed.
    pub async fn add(&self, board: Board) -> Result<Arc<Board>> {
        let mut boards = self.boards.write().await;
        if boards.contains_key(board.name()) {
            return Err(Error::invalid_argument(format!(
                "board '{}' is already managed",
                board.name()
            )));
        }
        let board = Arc::new(board);
        boards.insert(board.name().to_string(), Arc::clone(&board));
        info!("Managing board {}", board.name());
        Ok(board)
    }

    /// Create and register a board on `transport`.
    ///
    /// # Errors
    ///
    /// As [`BoardManager::add`].
    pub async fn connect(
        &self,
        name: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Arc<Board>> {
        self.add(Board::with_config(name, transport, self.config.clone()))
            .await
    }

    /// Get a board by name.
    pub async fn get(&self, name: &str) -> Option<Arc<Board>> {
        self.boards.read().await.get(name).cloned()
    }

    /// Stop managing a board.
    ///
    /// The board stays usable through any `Arc` still held elsewhere.
    pub async fn remove(&self, name: &str) -> Option<Arc<Board>> {
        let removed = self.boards.write().await.remove(name);
        if removed.is_some() {
            info!("Removed board {}", name);
        }
        removed
    }

    /// Names of all managed boards, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.boards.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of managed boards.
    pub async fn len(&self) -> usize {
        self.boards.read().await.len()
    }

    /// Whether no board is managed.
    pub async fn is_empty(&self) -> bool {
        self.boards.read().await.is_empty()
    }

    /// Names of boards with an active recording.
    pub async fn recording(&self) -> Vec<String> {
        let boards: Vec<Arc<Board>> = self.boards.read().await.values().cloned().collect();
        let mut names = Vec::new();
        for board in boards {
            if board.is_recording().await {
                names.push(board.name().to_string());
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[tokio::test]
    async fn test_add_get_remove() {
        let manager = BoardManager::new();
        manager
            .connect("left", Arc::new(MockTransport::new()))
            .await
            .unwrap();
        manager
            .connect("right", Arc::new(MockTransport::new()))
            .await
            .unwrap();

        assert_eq!(manager.len().await, 2);
        assert_eq!(manager.names().await, vec!["left", "right"]);
        assert!(manager.get("left").await.is_some());

        assert!(manager.remove("left").await.is_some());
        assert!(manager.get("left").await.is_none());
        assert!(manager.remove("left").await.is_none());
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let manager = BoardManager::new();
        manager
            .connect("left", Arc::new(MockTransport::new()))
            .await
            .unwrap();
        let err = manager
            .connect("left", Arc::new(MockTransport::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_recording_is_per_board() {
        let manager = BoardManager::new();
        let left = manager
            .connect("left", Arc::new(MockTransport::new()))
            .await
            .unwrap();
        manager
            .connect("right", Arc::new(MockTransport::new()))
            .await
            .unwrap();

        left.begin_recording(&left.switch_state_signal())
            .await
            .unwrap();
        assert_eq!(manager.recording().await, vec!["left"]);
    }
}
