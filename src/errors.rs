// Error types for csrfprobe
// Fatal conditions only; heuristic outcomes are plain enums elsewhere

use thiserror::Error;

/// Result alias used across the audit phases.
pub type AuditResult<T> = Result<T, AuditError>;

/// Conditions that abort an audit run.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("http client initialisation failed: {0}")]
    Client(#[from] reqwest::Error),
    #[error("url parse error: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unable to read signature database {path}: {source}")]
    SignatureDbRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("signature database is not valid JSON: {0}")]
    SignatureDbParse(#[from] serde_json::Error),
    #[error("invalid signature pattern '{pattern}': {source}")]
    InvalidSignature {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("no usable token found after {attempts} samples")]
    NoUsableToken { attempts: usize },
    #[error("no testable endpoint found")]
    NoTestableEndpoint,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditError {
    pub fn transport(url: &str, reason: impl ToString) -> Self {
        AuditError::Transport {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
