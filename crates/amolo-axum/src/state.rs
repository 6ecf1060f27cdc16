//! Shared application state type.

use std::sync::Arc;

use amolo_core::ServiceError;

use crate::bootstrap::AxumContext;
use crate::error::HttpError;

/// Application state shared across all handlers.
pub type AppState = Arc<AxumContext>;

impl AxumContext {
    /// Convert a relay failure into the response error for this deployment.
    pub(crate) fn http_error(&self, err: ServiceError) -> HttpError {
        HttpError::from(err).redacted(self.environment)
    }
}
