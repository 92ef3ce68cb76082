// Hash signature database for csrfprobe
// Loaded once from JSON and used to guess which algorithm produced a token

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::errors::{AuditError, AuditResult};

const BUILTIN_DB: &str = include_str!("../db/hashes.json");

/// One raw entry of the JSON database.
#[derive(Debug, Clone, Deserialize)]
pub struct SignatureEntry {
    pub regex: String,
    pub matches: Vec<String>,
}

#[derive(Debug, Clone)]
struct HashSignature {
    pattern: Regex,
    names: Vec<String>,
}

/// Ordered, read-only list of hash signatures.
#[derive(Debug, Clone)]
pub struct SignatureDb {
    signatures: Vec<HashSignature>,
}

impl SignatureDb {
    /// The database shipped with the binary.
    pub fn builtin() -> AuditResult<Self> {
        Self::from_json(BUILTIN_DB)
    }

    pub fn load(path: &Path) -> AuditResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| AuditError::SignatureDbRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> AuditResult<Self> {
        let entries: Vec<SignatureEntry> = serde_json::from_str(data)?;
        Self::from_entries(entries)
    }

    /// Patterns are anchored at the start of the token and are case-sensitive.
    pub fn from_entries(entries: Vec<SignatureEntry>) -> AuditResult<Self> {
        let signatures = entries
            .into_iter()
            .map(|entry| -> AuditResult<HashSignature> {
                let pattern = Regex::new(&format!("^(?:{})", entry.regex)).map_err(|source| {
                    AuditError::InvalidSignature {
                        pattern: entry.regex.clone(),
                        source,
                    }
                })?;
                Ok(HashSignature {
                    pattern,
                    names: entry.matches,
                })
            })
            .collect::<AuditResult<Vec<_>>>()?;
        Ok(Self { signatures })
    }

    /// Algorithm names of every signature matching `token`, in database order.
    ///
    /// Names are not deduplicated across signatures.
    pub fn matches(&self, token: &str) -> Vec<String> {
        self.signatures
            .iter()
            .filter(|sig| sig.pattern.is_match(token))
            .flat_map(|sig| sig.names.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}
