use std::path::{Path, PathBuf};

use thiserror::Error;

/**
 * \brief Failures on the critical path of an exchange.
 *
 * The `Display` text is what the user sees when an exchange fails.
 */
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("config error: {0}")]
    Config(String),

    #[error("auth error: {message}")]
    Auth {
        /** \brief Status of the credential endpoint, `None` for transport failures */
        status: Option<u16>,
        message: String,
    },

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("request status not 200: {status}")]
    Request { status: u16 },

    #[error("parse error: {0}")]
    Parse(String),
}

impl ChatError {
    pub(crate) fn auth_status(status: u16) -> Self {
        Self::Auth {
            status: Some(status),
            message: format!("auth request status not 200: {status}"),
        }
    }

    pub(crate) fn auth_transport(err: impl std::fmt::Display) -> Self {
        Self::Auth {
            status: None,
            message: err.to_string(),
        }
    }
}

/**
 * \brief Credential/transcript file failures. Never fails an exchange; the
 * core logs these and carries on.
 */
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error while {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    /**
     * \brief True when the file simply does not exist yet.
     */
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
