//! Error types for the page engine

use serde::{Deserialize, Serialize};

/// Everything that can stop a navigation or the initial setup.
///
/// None of these are fatal: a failed navigation leaves the current page as it was.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PageError {
    /// Non-2xx response or transport failure (status 0)
    #[error("Fetch failed: {status} {status_text}")]
    Fetch { status: u16, status_text: String },

    /// The fetched document lacks a title or a main-content fragment
    #[error("Malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    /// A link navigation arrived while another one was still in flight
    #[error("Navigation to {url} rejected: another navigation is in flight")]
    Busy { url: String },

    /// A required landmark element is missing from the live document
    #[error("Missing landmark element: [{marker}]")]
    MissingLandmark { marker: String },

    /// The host environment refused an operation
    #[error("Host error: {reason}")]
    Host { reason: String },
}

impl PageError {
    pub fn host(reason: impl Into<String>) -> Self {
        Self::Host {
            reason: reason.into(),
        }
    }

    /// Whether the pipeline reached the network before failing.
    #[inline]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::MalformedResponse { .. })
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "network",
            Self::MalformedResponse { .. } => "document",
            Self::Busy { .. } => "concurrency",
            Self::MissingLandmark { .. } => "markup",
            Self::Host { .. } => "host",
        }
    }
}

impl From<serde_json::Error> for PageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Host {
            reason: format!("config error: {err}"),
        }
    }
}
