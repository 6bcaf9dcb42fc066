// Alumni service - admin review of self-registered alumni accounts
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::ModerationStore;
use crate::error::{AppError, Result};
use crate::models::{ApprovalStatus, PendingAlumnus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlumniAction {
    Approve,
    Reject,
}

impl AlumniAction {
    pub fn approval_status(&self) -> ApprovalStatus {
        match self {
            AlumniAction::Approve => ApprovalStatus::Approved,
            AlumniAction::Reject => ApprovalStatus::Rejected,
        }
    }
}

pub struct AlumniService {
    store: Arc<dyn ModerationStore>,
}

impl AlumniService {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    pub async fn pending(&self) -> Result<Vec<PendingAlumnus>> {
        self.store.list_pending_alumni().await
    }

    pub async fn review(&self, alumni_id: Uuid, action: AlumniAction) -> Result<ApprovalStatus> {
        let status = action.approval_status();

        if !self.store.set_alumni_approval(alumni_id, status).await? {
            return Err(AppError::NotFound(format!("Alumni {} not found", alumni_id)));
        }

        tracing::info!(user_id = %alumni_id, approval_status = status.as_str(), "Alumni reviewed");

        Ok(status)
    }
}
