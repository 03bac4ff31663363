//! Issue lifecycle and attachment housekeeping on top of the `db` entities.

pub mod access;
pub mod attachment_migration;
pub mod error;
pub mod history;
pub mod issue_form;
pub mod issue_service;
pub mod review_board;
pub mod status_transitions;

pub use error::ServiceError;
