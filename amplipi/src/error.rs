use crate::models::{GroupId, ZoneId};

/// Errors surfaced by the device API layer.
///
/// The aggregation and fitting algorithms never produce these; they are total
/// over any well-typed snapshot.
#[derive(Debug, thiserror::Error)]
pub enum AmpError {
    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Device returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode device response: {0}")]
    Decode(String),

    #[error("Invalid API url: {0}")]
    InvalidUrl(String),

    #[error("Zone not found: {0:?}")]
    ZoneNotFound(ZoneId),

    #[error("Group not found: {0:?}")]
    GroupNotFound(GroupId),
}

impl AmpError {
    /// True for failures the poller should report as "disconnected".
    pub fn is_transient(&self) -> bool {
        matches!(self, AmpError::Communication(_) | AmpError::Http { .. })
    }
}

impl From<reqwest::Error> for AmpError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            AmpError::Decode(error.to_string())
        } else {
            AmpError::Communication(error.to_string())
        }
    }
}

impl From<serde_json::Error> for AmpError {
    fn from(error: serde_json::Error) -> Self {
        AmpError::Decode(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AmpError>;
