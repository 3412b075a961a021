//! Action log records
//!
//! The action log records that a named operation ran with some parameters.
//! It is written outside the apply scope, so an entry neither proves nor
//! excludes that the matching batch committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parameters an action was invoked with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionParams {
    /// Free-form JSON payload
    pub data: serde_json::Value,
}

impl ActionParams {
    /// Parameters carrying `data`
    pub fn new(data: serde_json::Value) -> Self {
        Self { data }
    }
}

/// One row of the action log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    /// Unique id of the entry
    pub id: String,
    /// Action name
    pub name: String,
    /// JSON-encoded parameters
    pub params: Vec<u8>,
    /// When the entry was written
    pub created_at: DateTime<Utc>,
}

impl ActionRecord {
    /// Decode the stored parameters
    pub fn params_json(&self) -> crate::Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.params)?)
    }
}
