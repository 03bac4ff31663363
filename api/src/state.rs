//! Application state shared by every route handler through axum's `State`.

use sea_orm::DatabaseConnection;
use services::{
    ServiceError,
    issue_service::IssueDeps,
    review_board::{ReviewBoard, review_board_from_config},
    status_transitions::StatusTransitions,
};
use std::sync::Arc;
use storage::{S3Overlay, StorageBackend, StorageConfig, create_storage};

/// Database handle plus the collaborators issue handling depends on.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    /// Legacy attachment storage; new uploads land here.
    storage: Arc<dyn StorageBackend>,
    overlay: S3Overlay,
    review_board: Arc<dyn ReviewBoard>,
    transitions: Arc<StatusTransitions>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn StorageBackend>,
        overlay: S3Overlay,
        review_board: Arc<dyn ReviewBoard>,
        transitions: StatusTransitions,
    ) -> Self {
        Self {
            db,
            storage,
            overlay,
            review_board,
            transitions: Arc::new(transitions),
        }
    }

    /// Builds the state from `AppConfig`: local media root, S3 overlay,
    /// review board client and the status transition table.
    pub async fn from_config(db: DatabaseConnection) -> Result<Self, ServiceError> {
        util::paths::ensure_dir(util::paths::storage_root())?;
        let storage = create_storage(StorageConfig::legacy_from_config()).await?;

        Ok(Self::new(
            db,
            storage,
            S3Overlay::from_config(),
            review_board_from_config(),
            StatusTransitions::from_config()?,
        ))
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn overlay(&self) -> &S3Overlay {
        &self.overlay
    }

    pub fn transitions(&self) -> &StatusTransitions {
        &self.transitions
    }

    pub fn issue_deps(&self) -> IssueDeps {
        IssueDeps {
            transitions: self.transitions.clone(),
            review_board: self.review_board.clone(),
            storage: self.storage.clone(),
        }
    }
}
