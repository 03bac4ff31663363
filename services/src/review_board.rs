//! Client for the external code review board.
//!
//! Comments with attachments on review-board tasks are forwarded as review
//! requests. Failures never abort the comment; the caller records the
//! outcome on the history entry instead.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use util::config;

#[derive(Debug, Error)]
pub enum ReviewBoardError {
    #[error("Review board integration is not configured")]
    Disabled,

    #[error("Review board request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected review board response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Clone, Copy)]
pub struct ReviewFile<'a> {
    pub filename: &'a str,
    pub content: &'a [u8],
}

#[derive(Debug, Clone)]
pub struct ReviewUpload<'a> {
    pub issue_id: i64,
    /// Review request to attach a new diff to, if the issue already has one.
    pub review_id: Option<i64>,
    pub summary: String,
    /// Username the request is filed on behalf of.
    pub submitter: &'a str,
    pub files: &'a [ReviewFile<'a>],
}

#[async_trait]
pub trait ReviewBoard: Send + Sync {
    /// Uploads the files and returns the review request id.
    async fn upload_review(&self, upload: ReviewUpload<'_>) -> Result<i64, ReviewBoardError>;
}

/// Used when `RB_URL` is not configured.
#[derive(Debug, Clone, Default)]
pub struct DisabledReviewBoard;

#[async_trait]
impl ReviewBoard for DisabledReviewBoard {
    async fn upload_review(&self, _upload: ReviewUpload<'_>) -> Result<i64, ReviewBoardError> {
        Err(ReviewBoardError::Disabled)
    }
}

/// Review Board web API client.
#[derive(Debug, Clone)]
pub struct HttpReviewBoard {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct ReviewRequestEnvelope {
    review_request: ReviewRequestBody,
}

#[derive(Debug, Deserialize)]
struct ReviewRequestBody {
    id: i64,
}

impl HttpReviewBoard {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        }
    }

    fn endpoint(&self, review_id: Option<i64>) -> String {
        match review_id {
            Some(id) => format!("{}/api/review-requests/{id}/diffs/", self.base_url),
            None => format!("{}/api/review-requests/", self.base_url),
        }
    }
}

#[async_trait]
impl ReviewBoard for HttpReviewBoard {
    async fn upload_review(&self, upload: ReviewUpload<'_>) -> Result<i64, ReviewBoardError> {
        let mut form = Form::new()
            .text("summary", upload.summary.clone())
            .text("submit_as", upload.submitter.to_string())
            .text("issue_id", upload.issue_id.to_string());

        for file in upload.files {
            form = form.part(
                "path",
                Part::bytes(file.content.to_vec()).file_name(file.filename.to_string()),
            );
        }

        let response = self
            .client
            .post(self.endpoint(upload.review_id))
            .basic_auth(&self.username, Some(&self.password))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(issue_id = upload.issue_id, %status, "review board rejected upload");
            return Err(ReviewBoardError::UnexpectedResponse(status.to_string()));
        }

        // Diff uploads answer with the diff, not the request; keep the known id.
        if let Some(id) = upload.review_id {
            return Ok(id);
        }

        let body: ReviewRequestEnvelope = response.json().await?;
        info!(issue_id = upload.issue_id, review_id = body.review_request.id, "review request created");
        Ok(body.review_request.id)
    }
}

/// HTTP client when `RB_URL` is set, the disabled stub otherwise.
pub fn review_board_from_config() -> Arc<dyn ReviewBoard> {
    match config::rb_url() {
        Some(url) => Arc::new(HttpReviewBoard::new(
            url,
            config::rb_username(),
            config::rb_password(),
        )),
        None => Arc::new(DisabledReviewBoard),
    }
}
