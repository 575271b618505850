//! Access gate for kvgate.
//!
//! Every storage request carries an opaque token. The gate hands the token
//! to a [`TokenVerifier`] (normally the remote decryption service), then runs
//! the recovered record through a pipeline of stages: the record must be
//! fresh (at most 20 s old by default) and must carry the configured shared
//! secret. The outcome is a plain allow/deny; reasons go to the log only.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use kvgate_gate::{AccessGate, GateConfig, StaticTokenVerifier, VerifiedToken};
//!
//! # tokio_test_block_on(async {
//! let verifier = StaticTokenVerifier::new()
//!     .with_token("opaque", VerifiedToken::new(1_000, "s3cret"));
//! let gate = AccessGate::with_default_stages(GateConfig::new("s3cret"), Arc::new(verifier));
//! assert!(gate.authorize("opaque", 5_000).await.is_allowed());
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod remote;
pub mod stage;
pub mod stages;
pub mod verifier;

// Re-exports for convenience.
pub use config::{GateConfig, DEFAULT_FRESHNESS_WINDOW};
pub use error::{GateError, GateResult};
pub use gate::{AccessDecision, AccessGate};
pub use remote::{RemoteTokenVerifier, DEFAULT_VERIFY_URL};
pub use stage::{AccessContext, AccessStage, StageDecision};
pub use stages::{FreshnessStage, SecretStage};
pub use verifier::{StaticTokenVerifier, TokenVerifier, VerifiedToken};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    const SECRET: &str = "shared-secret";
    const MINTED_AT: i64 = 1_700_000_000_000;

    fn gate_with(verifier: impl TokenVerifier + 'static) -> AccessGate {
        AccessGate::with_default_stages(GateConfig::new(SECRET), Arc::new(verifier))
    }

    fn default_gate() -> AccessGate {
        gate_with(
            StaticTokenVerifier::new()
                .with_token("good", VerifiedToken::new(MINTED_AT, SECRET))
                .with_token("wrong-secret", VerifiedToken::new(MINTED_AT, "nope")),
        )
    }

    struct FailingVerifier;

    #[async_trait]
    impl TokenVerifier for FailingVerifier {
        async fn verify(&self, _token: &str) -> GateResult<Option<VerifiedToken>> {
            Err(GateError::Verification("connection refused".into()))
        }
    }

    // -----------------------------------------------------------------------
    // 1. Default pipeline shape
    // -----------------------------------------------------------------------
    #[test]
    fn default_pipeline_has_two_stages() {
        let gate = default_gate();
        assert_eq!(gate.stage_count(), 2);
        let debug = format!("{gate:?}");
        assert!(debug.contains("freshness"));
        assert!(debug.contains("secret"));
    }

    // -----------------------------------------------------------------------
    // 2. Freshness window
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn allows_within_window() {
        let gate = default_gate();
        assert!(gate.authorize("good", MINTED_AT + 1).await.is_allowed());
    }

    #[tokio::test]
    async fn allows_at_exactly_window() {
        let gate = default_gate();
        assert!(gate.authorize("good", MINTED_AT + 20_000).await.is_allowed());
    }

    #[tokio::test]
    async fn denies_past_window() {
        let gate = default_gate();
        let decision = gate.authorize("good", MINTED_AT + 20_001).await;
        assert!(!decision.is_allowed());
    }

    // -----------------------------------------------------------------------
    // 3. Secret mismatch denies regardless of time
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn denies_secret_mismatch_even_when_fresh() {
        let gate = default_gate();
        assert!(!gate.authorize("wrong-secret", MINTED_AT).await.is_allowed());
    }

    // -----------------------------------------------------------------------
    // 4. Verifier outcomes
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn unknown_token_denied() {
        let gate = default_gate();
        assert!(!gate.authorize("mystery", MINTED_AT).await.is_allowed());
    }

    #[tokio::test]
    async fn empty_token_denied_without_verification() {
        let gate = gate_with(FailingVerifier);
        assert_eq!(
            gate.authorize("", MINTED_AT).await,
            AccessDecision::Deny {
                reason: "empty token".into()
            }
        );
    }

    #[tokio::test]
    async fn verifier_failure_is_deny() {
        let gate = gate_with(FailingVerifier);
        let decision = gate.authorize("anything", MINTED_AT).await;
        match decision {
            AccessDecision::Deny { reason } => assert!(reason.contains("connection refused")),
            AccessDecision::Allow => panic!("verifier failure must deny"),
        }
    }

    // -----------------------------------------------------------------------
    // 5. Empty pipeline only needs a verified token
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn empty_pipeline_allows_any_verified_token() {
        let verifier =
            StaticTokenVerifier::new().with_token("t", VerifiedToken::new(0, "whatever"));
        let gate = AccessGate::new(GateConfig::new(SECRET), Arc::new(verifier));
        assert!(gate.authorize("t", i64::MAX).await.is_allowed());
    }

    #[tokio::test]
    async fn authorize_now_uses_wall_clock() {
        let now = chrono::Utc::now().timestamp_millis();
        let verifier = StaticTokenVerifier::new()
            .with_token("fresh", VerifiedToken::new(now, SECRET))
            .with_token("stale", VerifiedToken::new(now - 60_000, SECRET));
        let gate = gate_with(verifier);
        assert!(gate.authorize_now("fresh").await.is_allowed());
        assert!(!gate.authorize_now("stale").await.is_allowed());
    }
}
