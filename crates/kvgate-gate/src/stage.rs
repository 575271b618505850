use crate::config::GateConfig;
use crate::verifier::VerifiedToken;

// ---------------------------------------------------------------------------
// StageDecision
// ---------------------------------------------------------------------------

/// The outcome of a single gate stage evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// The stage passed; proceed to the next stage.
    Pass,
    /// The stage failed; the request is denied.
    Fail { reason: String },
}

impl StageDecision {
    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Fail {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the decision is `Pass`.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

// ---------------------------------------------------------------------------
// AccessContext
// ---------------------------------------------------------------------------

/// Request-scoped information available to every stage.
pub struct AccessContext<'a> {
    /// Current time in milliseconds since the Unix epoch.
    pub now_ms: i64,
    pub config: &'a GateConfig,
}

// ---------------------------------------------------------------------------
// AccessStage trait
// ---------------------------------------------------------------------------

/// A single check applied to a verified token.
///
/// Stages run in order after the token has been verified; the first failure
/// denies the request. The trait is object-safe so stages can be stored in a
/// `Vec<Box<dyn AccessStage>>`.
pub trait AccessStage: Send + Sync {
    /// Human-readable name of this stage (e.g., "freshness", "secret").
    fn name(&self) -> &str;

    fn evaluate(&self, token: &VerifiedToken, context: &AccessContext<'_>) -> StageDecision;
}
