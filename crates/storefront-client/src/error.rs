use thiserror::Error;

/// Errors returned by [`crate::CommerceClient`].
#[derive(Debug, Error)]
pub enum CommerceError {
    /// No response was received: connect failure, timeout, or a body that
    /// could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The platform rejected the request (HTTP 4xx).
    #[error("request rejected with HTTP {status}: {message}")]
    Client { status: u16, message: String },

    /// The platform failed to handle the request (HTTP 5xx).
    #[error("commerce platform error HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// Any other non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body did not match the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl CommerceError {
    /// HTTP status carried by the error, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            CommerceError::Client { status, .. }
            | CommerceError::Server { status, .. }
            | CommerceError::UnexpectedStatus { status, .. } => Some(*status),
            CommerceError::Network(_)
            | CommerceError::Deserialize { .. }
            | CommerceError::InvalidBaseUrl { .. } => None,
        }
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, CommerceError::Network(_))
    }

    /// Short message suitable for showing to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CommerceError::Network(_) => {
                "Could not reach the store. Check that the server is online.".to_string()
            }
            CommerceError::Client { message, .. } => message.clone(),
            CommerceError::Server { .. } | CommerceError::UnexpectedStatus { .. } => {
                "The store is having trouble right now. Please try again.".to_string()
            }
            CommerceError::Deserialize { .. } | CommerceError::InvalidBaseUrl { .. } => {
                "The store returned an unexpected response.".to_string()
            }
        }
    }
}
