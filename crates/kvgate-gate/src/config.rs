use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Default tolerance between a token's verification timestamp and now.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_millis(20_000);

/// Configuration for the access gate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateConfig {
    /// Secret every verified token must carry, compared exactly.
    pub shared_secret: String,
    /// Maximum age of a verified token. The boundary itself is accepted.
    pub freshness_window: Duration,
}

impl GateConfig {
    pub fn new(shared_secret: impl Into<String>) -> Self {
        Self {
            shared_secret: shared_secret.into(),
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
        }
    }

    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    /// The freshness window in whole milliseconds.
    pub fn freshness_window_ms(&self) -> i64 {
        i64::try_from(self.freshness_window.as_millis()).unwrap_or(i64::MAX)
    }

    /// Reject configurations that would let every token through or none.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.shared_secret.is_empty() {
            return Err(GateError::Config("shared secret must not be empty".into()));
        }
        Ok(())
    }
}
