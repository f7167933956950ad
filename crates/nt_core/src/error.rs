use chrono::NaiveDate;
use thiserror::Error;

/// Which date field of the filter a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    From,
    To,
}

impl std::fmt::Display for DateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateField::From => write!(f, "from"),
            DateField::To => write!(f, "to"),
        }
    }
}

/// Filter input rejected before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid date in '{field}': {value} (expected YYYY-MM-DD)")]
    InvalidDate { field: DateField, value: String },

    #[error("date range is reversed: {from} is after {to}")]
    DateRangeReversed { from: NaiveDate, to: NaiveDate },
}

impl ValidationError {
    /// The form field the error should be shown next to.
    pub fn field(&self) -> DateField {
        match self {
            ValidationError::InvalidDate { field, .. } => *field,
            ValidationError::DateRangeReversed { .. } => DateField::To,
        }
    }
}

/// Failure talking to the article collaborator.
///
/// Cloneable so a single de-duplicated request can hand the same failure to
/// every observer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("API error {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("news service is unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected response from news service: {0}")]
    MalformedResponse(String),
}

impl RemoteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message shown to the user. Collaborator failures are surfaced verbatim,
    /// transport failures get a generic message.
    pub fn user_message(&self) -> String {
        match self {
            RemoteError::RequestFailed { .. } => self.to_string(),
            RemoteError::Unreachable(_) => {
                "Could not reach the news service. Check your connection and try again.".to_string()
            }
            RemoteError::MalformedResponse(_) => self.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Invalid article id: {0}")]
    InvalidArticleId(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_message_is_verbatim() {
        let err = RemoteError::RequestFailed {
            status: 500,
            body: "{\"detail\":\"boom\"}".to_string(),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.user_message(), "API error 500: {\"detail\":\"boom\"}");
    }

    #[test]
    fn test_unreachable_message_is_generic() {
        let err = RemoteError::Unreachable("tcp connect error: Connection refused".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.user_message().contains("Connection refused"));
    }

    #[test]
    fn test_reversed_range_points_at_to_field() {
        let err = ValidationError::DateRangeReversed {
            from: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert_eq!(err.field(), DateField::To);
        assert_eq!(
            err.to_string(),
            "date range is reversed: 2024-06-01 is after 2024-01-01"
        );
    }
}
