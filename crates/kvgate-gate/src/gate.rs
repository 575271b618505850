use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::GateConfig;
use crate::stage::{AccessContext, AccessStage, StageDecision};
use crate::stages::{FreshnessStage, SecretStage};
use crate::verifier::TokenVerifier;

// ---------------------------------------------------------------------------
// AccessDecision
// ---------------------------------------------------------------------------

/// Final verdict for one request.
///
/// The deny reason is for server-side logs only; callers always see the same
/// generic rejection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny { reason: String },
}

impl AccessDecision {
    fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

// ---------------------------------------------------------------------------
// AccessGate
// ---------------------------------------------------------------------------

/// Every storage request passes the gate before touching the backend.
///
/// The gate first asks its [`TokenVerifier`] to recover the token record,
/// then runs the record through its stages, fail-fast. Any verifier error is
/// a deny: a broken verification service never surfaces as a server error.
pub struct AccessGate {
    verifier: Arc<dyn TokenVerifier>,
    stages: Vec<Box<dyn AccessStage>>,
    config: GateConfig,
}

impl AccessGate {
    /// Create a gate with an empty stage pipeline.
    pub fn new(config: GateConfig, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            verifier,
            stages: Vec::new(),
            config,
        }
    }

    /// Create a gate with the default pipeline: Freshness -> Secret.
    pub fn with_default_stages(config: GateConfig, verifier: Arc<dyn TokenVerifier>) -> Self {
        let mut gate = Self::new(config, verifier);
        gate.add_stage(Box::new(FreshnessStage));
        gate.add_stage(Box::new(SecretStage));
        gate
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn AccessStage>) {
        self.stages.push(stage);
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Decide whether `token` grants access at `now_ms`.
    pub async fn authorize(&self, token: &str, now_ms: i64) -> AccessDecision {
        if token.is_empty() {
            return AccessDecision::deny("empty token");
        }

        let record = match self.verifier.verify(token).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("token rejected by verifier");
                return AccessDecision::deny("token could not be verified");
            }
            Err(err) => {
                warn!(error = %err, "token verification failed");
                return AccessDecision::deny(format!("verification failed: {err}"));
            }
        };

        let context = AccessContext {
            now_ms,
            config: &self.config,
        };
        for stage in &self.stages {
            if let StageDecision::Fail { reason } = stage.evaluate(&record, &context) {
                warn!(stage = stage.name(), %reason, "access denied");
                return AccessDecision::deny(reason);
            }
        }

        debug!(token_time = record.time, "access granted");
        AccessDecision::Allow
    }

    /// [`Self::authorize`] against the current wall clock.
    pub async fn authorize_now(&self, token: &str) -> AccessDecision {
        self.authorize(token, chrono::Utc::now().timestamp_millis())
            .await
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stages: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("AccessGate")
            .field("stages", &stages)
            .field("freshness_window", &self.config.freshness_window)
            .finish()
    }
}
