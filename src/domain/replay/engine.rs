//! Replay of recorded call histories

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::domain::cache::{decode_int, decode_string};
use crate::domain::instrument::{inputs_key, outputs_key};
use crate::domain::store::ValueStore;
use crate::domain::DomainError;

/// One recorded call: normalized arguments and normalized result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayEntry {
    pub input: String,
    pub output: String,
}

impl ReplayEntry {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// The recorded history of one operation identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub identity: String,
    /// Value of the invocation counter, 0 if the operation never ran
    pub count: i64,
    /// Calls in the order they were made
    pub entries: Vec<ReplayEntry>,
}

impl Replay {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.count == 1 { "" } else { "s" };
        write!(f, "{} was called {} time{}:", self.identity, self.count, plural)?;

        for entry in &self.entries {
            write!(f, "\n{}(*{}) -> {}", self.identity, entry.input, entry.output)?;
        }

        Ok(())
    }
}

/// Reads counters and history lists back out of the store
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    store: Arc<dyn ValueStore>,
}

impl ReplayEngine {
    pub fn new(store: Arc<dyn ValueStore>) -> Self {
        Self { store }
    }

    /// Returns the counter and the `(input, output)` pairs for `identity`
    ///
    /// Inputs and outputs are paired by position and truncated to the
    /// shorter list, so a call still in flight is left out.
    pub async fn replay_entries(&self, identity: &str) -> Result<Replay, DomainError> {
        let count = match self.store.get_raw(identity).await? {
            Some(raw) => decode_int(raw)?,
            None => 0,
        };

        let inputs = self.read_history(&inputs_key(identity)).await?;
        let outputs = self.read_history(&outputs_key(identity)).await?;

        let entries = inputs
            .into_iter()
            .zip(outputs)
            .map(|(input, output)| ReplayEntry { input, output })
            .collect();

        Ok(Replay {
            identity: identity.to_string(),
            count,
            entries,
        })
    }

    /// Logs the replay report for `identity` and returns it
    pub async fn replay(&self, identity: &str) -> Result<String, DomainError> {
        let replay = self.replay_entries(identity).await?;
        let report = replay.to_string();

        for line in report.lines() {
            info!(identity, "{}", line);
        }

        Ok(report)
    }

    async fn read_history(&self, list_key: &str) -> Result<Vec<String>, DomainError> {
        self.store
            .read_list(list_key)
            .await?
            .into_iter()
            .map(decode_string)
            .collect()
    }
}
