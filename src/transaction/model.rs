use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::NodeError;

/// A post stored on the ledger. The chain treats it as an opaque payload.
///
/// Field order is alphabetical and is part of the canonical hashing format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub author: String,
    pub content: String,
    /// Unix time in seconds, stamped by the node on intake.
    pub timestamp: f64,
}

impl Transaction {
    /// Hashable identity; the timestamp is compared by its exact bits.
    pub fn identity(&self) -> (String, String, u64) {
        (
            self.author.clone(),
            self.content.clone(),
            self.timestamp.to_bits(),
        )
    }
}

/// Transaction as submitted by a client, before validation and stamping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTransaction {
    pub author: Option<String>,
    pub content: Option<String>,
}

impl NewTransaction {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            content: Some(content.into()),
        }
    }

    /// Check required fields and stamp the current time.
    pub fn into_transaction(self) -> Result<Transaction, NodeError> {
        let author = required(self.author, "author")?;
        let content = required(self.content, "content")?;
        Ok(Transaction {
            author,
            content,
            timestamp: unix_now(),
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, NodeError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(NodeError::MissingField(field)),
    }
}

/// Current Unix time as fractional seconds (microsecond precision).
pub fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
