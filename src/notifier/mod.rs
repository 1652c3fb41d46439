//! Issue-tracker notification sink.
//!
//! The batch only needs `create_ticket`; the `find_*` helpers resolve
//! human-readable names into tracker ids once, at startup.

pub mod trello;

use thiserror::Error;

pub use trello::{TrelloClient, TrelloConfig};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("Tracker rejected the credentials: {0}")]
    Auth(String),

    #[error("Tracker request to {endpoint} failed: {message}")]
    Http { endpoint: String, message: String },

    #[error("Tracker API error ({status}) on {endpoint}: {message}")]
    Api {
        status: u16,
        endpoint: String,
        message: String,
    },

    #[error("Could not decode tracker response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl TrackerError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        TrackerError::NotFound {
            kind,
            name: name.into(),
        }
    }
}

/// Sink for flagged entries, normally backed by a hosted board.
pub trait IssueNotifier {
    /// Id of the board called `name`.
    fn find_board_id(&self, name: &str) -> Result<String, TrackerError>;

    /// Id of the list called `name` on board `board_id`.
    fn find_list_id(&self, board_id: &str, name: &str) -> Result<String, TrackerError>;

    /// Ids for every member name, in order. Fails on the first unknown name.
    fn find_member_ids(&self, names: &[String]) -> Result<Vec<String>, TrackerError>;

    /// Create a ticket and return its id.
    fn create_ticket(
        &self,
        list_id: &str,
        title: &str,
        description: &str,
        member_ids: &[String],
    ) -> Result<String, TrackerError>;
}
