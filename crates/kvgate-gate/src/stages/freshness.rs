use crate::stage::{AccessContext, AccessStage, StageDecision};
use crate::verifier::VerifiedToken;

/// Freshness window stage.
///
/// Passes when `now - token.time` is at most the configured window. Tokens
/// stamped in the future pass, which tolerates clock skew in either direction.
pub struct FreshnessStage;

impl AccessStage for FreshnessStage {
    fn name(&self) -> &str {
        "freshness"
    }

    fn evaluate(&self, token: &VerifiedToken, context: &AccessContext<'_>) -> StageDecision {
        let age = context.now_ms.saturating_sub(token.time);
        let window = context.config.freshness_window_ms();
        if age > window {
            return StageDecision::fail(format!("token is {age}ms old, window is {window}ms"));
        }
        StageDecision::Pass
    }
}
