//! Error types for the n8n workflow builder
//!
//! Provides structured error types for the n8n API client, the node catalog
//! source, the MCP tool surface and the REST API.

use thiserror::Error;

/// Unified error type for the workflow builder
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // n8n API Errors
    // =========================================================================
    #[error("n8n connection error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("n8n API error ({status}): {body}")]
    RemoteApi { status: u16, body: String },

    // =========================================================================
    // Node Catalog Errors
    // =========================================================================
    #[error("Node catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Node catalog response parse error: {0}")]
    CatalogResponseParse(String),

    // =========================================================================
    // API Errors
    // =========================================================================
    #[error("Invalid resource URI: {0}")]
    InvalidResourceUri(String),

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Error {
    /// Check if this error is transient, i.e. the same call may succeed later
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(_) | Error::CatalogUnavailable(_) => true,
            Error::RemoteApi { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status reported by the n8n API, if any
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Error::RemoteApi { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for the workflow builder
pub type Result<T> = std::result::Result<T, Error>;
