use std::sync::Arc;

use nt_core::{RemoteError, ValidationError};

/// Why a view could not show its data.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewError {
    /// Rejected before any request was made.
    Validation(ValidationError),
    Remote(RemoteError),
}

impl ViewError {
    /// Text shown in the error state.
    pub fn message(&self) -> String {
        match self {
            ViewError::Validation(e) => e.to_string(),
            ViewError::Remote(e) => e.user_message(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ViewError::Validation(_) => None,
            ViewError::Remote(e) => e.status(),
        }
    }
}

impl From<ValidationError> for ViewError {
    fn from(e: ValidationError) -> Self {
        ViewError::Validation(e)
    }
}

impl From<RemoteError> for ViewError {
    fn from(e: RemoteError) -> Self {
        ViewError::Remote(e)
    }
}

/// Lifecycle of one remote read as seen by a view.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(Arc<T>),
    Failure(ViewError),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Success(data) => Some(data.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ViewError> {
        match self {
            FetchState::Failure(e) => Some(e),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading => "loading",
            FetchState::Success(_) => "success",
            FetchState::Failure(_) => "failure",
        }
    }
}
