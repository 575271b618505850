//! Built-in access stages.

pub mod freshness;
pub mod secret;

pub use freshness::FreshnessStage;
pub use secret::SecretStage;
