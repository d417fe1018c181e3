//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use sessions_core::labels::DEFAULT_SEED;
use sessions_core::session::SESSION_TIMEOUT_SECS;
use sessions_core::split::{DEFAULT_TEST_WEEKS, DEFAULT_TRAIN_WEEKS};
use sessions_core::{Error, Result};
use validator::Validate;

/// Settings shared by every job.
///
/// Week counts are not range-checked: a non-positive count yields empty
/// output and a warning rather than a configuration error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    /// Inactivity gap that closes a session, in seconds
    #[serde(default = "default_session_gap_secs")]
    #[validate(range(min = 1))]
    pub session_gap_secs: u32,
    #[serde(default = "default_train_weeks")]
    pub train_weeks: i64,
    #[serde(default = "default_test_weeks")]
    pub test_weeks: i64,
    /// Seed for the labeler's cut points
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Recall cutoff
    #[serde(default = "default_k")]
    #[validate(range(min = 1))]
    pub k: usize,
}

fn default_session_gap_secs() -> u32 {
    SESSION_TIMEOUT_SECS
}

fn default_train_weeks() -> i64 {
    DEFAULT_TRAIN_WEEKS
}

fn default_test_weeks() -> i64 {
    DEFAULT_TEST_WEEKS
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_k() -> usize {
    ranking_eval::DEFAULT_K
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            session_gap_secs: default_session_gap_secs(),
            train_weeks: default_train_weeks(),
            test_weeks: default_test_weeks(),
            seed: default_seed(),
            k: default_k(),
        }
    }
}

impl PipelineConfig {
    /// Checks the configuration, mapping failures to [`Error::Validation`].
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(|e| Error::validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.session_gap_secs, 1800);
        assert_eq!(config.train_weeks, 3);
        assert_eq!(config.test_weeks, 2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.k, 20);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"k": 5}"#).unwrap();
        assert_eq!(config.k, 5);
        assert_eq!(config.session_gap_secs, 1800);
    }

    #[test]
    fn test_zero_k_rejected() {
        let config = PipelineConfig { k: 0, ..Default::default() };
        assert!(matches!(config.check(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_zero_gap_rejected() {
        let config = PipelineConfig { session_gap_secs: 0, ..Default::default() };
        assert!(matches!(config.check(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_negative_weeks_allowed() {
        let config = PipelineConfig { train_weeks: -1, ..Default::default() };
        assert!(config.check().is_ok());
    }
}
