//! History of transitions executed through an opaque machine.
//!
//! Records carry only what the facade itself exposes: transition names,
//! timestamps and attempt counts. States are never named.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single executed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Name of the executed transition
    pub transition: String,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
    /// Which attempt succeeded (1 if it went through the first time)
    pub attempt: usize,
}

/// Ordered history of executed transitions.
///
/// `record` returns a new history with the transition appended; `push`
/// appends in place.
///
/// # Example
///
/// ```rust
/// use matryoshka::opaque::{TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let history = TransitionHistory::new();
/// let history = history.record(TransitionRecord {
///     transition: "deal".to_string(),
///     timestamp: Utc::now(),
///     attempt: 1,
/// });
///
/// assert_eq!(history.get_path(), vec!["deal"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionHistory {
    records: Vec<TransitionRecord>,
}

impl TransitionHistory {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// Append a record in place.
    pub fn push(&mut self, record: TransitionRecord) {
        self.records.push(record);
    }

    /// Names of the executed transitions, oldest first.
    pub fn get_path(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.transition.as_str())
            .collect()
    }

    /// Time between the first and last recorded transition.
    ///
    /// Returns `None` if nothing was recorded.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
