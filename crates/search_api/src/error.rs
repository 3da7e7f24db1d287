use search_ui::EndpointError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchApiError {
    #[error("{operation} request failed: {message}")]
    Endpoint {
        operation: &'static str,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("api key is required")]
    MissingApiKey,

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request was cancelled")]
    Cancelled,
}

impl SearchApiError {
    pub fn endpoint(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Endpoint {
            operation,
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn transport(operation: &'static str, error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "timed out".to_string()
        } else {
            error.to_string()
        };
        Self::Endpoint {
            operation,
            message,
            source: Some(error),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<&SearchApiError> for EndpointError {
    fn from(error: &SearchApiError) -> Self {
        match error {
            SearchApiError::Endpoint {
                operation, message, ..
            } => EndpointError::new(*operation, message.clone()),
            other => EndpointError::new("autocomplete", other.to_string()),
        }
    }
}
