//! Client error types

use thiserror::Error;
use uuid::Uuid;

use crate::models::time_entry::InvalidTransition;

/// Broad error families shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authorization,
    Network,
    Data,
    ThirdParty,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid data: {0}")]
    Data(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Time entry {0} is already running")]
    AlreadyActive(Uuid),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// The field has its own endpoint and a plain update would drop the change
    #[error("{table}.{field} cannot be changed by an update")]
    ReadOnlyField { table: &'static str, field: &'static str },

    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },
}

pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Authorization(_) => ErrorKind::Authorization,
            SyncError::Network(_) => ErrorKind::Network,
            SyncError::Service { .. } => ErrorKind::ThirdParty,
            SyncError::Data(_)
            | SyncError::NotFound(_)
            | SyncError::AlreadyActive(_)
            | SyncError::InvalidTransition(_)
            | SyncError::ReadOnlyField { .. } => ErrorKind::Data,
        }
    }

    pub fn is_authorization(&self) -> bool {
        self.kind() == ErrorKind::Authorization
    }

    /// Message suitable for a notification
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Authorization(_) => {
                "You do not have sufficient permissions to perform this action".to_string()
            }
            SyncError::Network(_) => "Connection problem, check your network and try again".to_string(),
            SyncError::AlreadyActive(_) => "A time tracking session is already running".to_string(),
            SyncError::InvalidTransition(e) => format!("Not possible: {}", e),
            SyncError::ReadOnlyField { field, .. } => {
                format!("The {} field has its own action and cannot be edited here", field)
            }
            _ => "The operation failed, please try again".to_string(),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Data(err.to_string())
        } else {
            SyncError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Data(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Data(format!("Local storage error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{time_entry::TimeAction, TimeEntryStatus};

    #[test]
    fn test_kinds() {
        assert_eq!(SyncError::Authorization("rls".into()).kind(), ErrorKind::Authorization);
        assert_eq!(SyncError::Network("timeout".into()).kind(), ErrorKind::Network);
        assert_eq!(
            SyncError::Service { status: 502, message: "bad gateway".into() }.kind(),
            ErrorKind::ThirdParty
        );
        assert_eq!(SyncError::AlreadyActive(Uuid::nil()).kind(), ErrorKind::Data);
    }

    #[test]
    fn test_user_messages() {
        assert!(SyncError::Authorization("x".into()).user_message().contains("permissions"));
        assert_eq!(
            SyncError::Data("x".into()).user_message(),
            "The operation failed, please try again"
        );

        let err: SyncError = InvalidTransition {
            from: Some(TimeEntryStatus::Completed),
            action: TimeAction::Pause,
        }
        .into();
        assert!(err.user_message().contains("completed"));
    }
}
