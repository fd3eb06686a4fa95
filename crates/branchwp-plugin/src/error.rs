//! Plugin error types.

use branchwp_service::ServiceError;
use thiserror::Error;

use crate::form::FormError;

/// Plugin error types.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A settings page is already bound to the route
    #[error("Route already bound: {0}")]
    DuplicateRoute(String),

    /// No settings page is bound to the route
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    /// The current user may not change the configuration
    #[error("Configuration of repository {0} is read only")]
    ReadOnly(String),

    /// Form error
    #[error(transparent)]
    Form(#[from] FormError),

    /// Service error
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl PluginError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::DuplicateRoute(_) => 409,
            Self::RouteNotFound(_) => 404,
            Self::ReadOnly(_) => 403,
            Self::Form(FormError::ReadOnly) => 403,
            Self::Form(_) => 400,
            Self::Service(e) => e.status_code(),
        }
    }
}

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;
