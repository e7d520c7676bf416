//! Engine configuration: retry, backoff, and approval policy.

use crate::{ConfigError, ForemanResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff policy between automatic retry attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed(Duration),
    /// Delay grows by `multiplier` per attempt, capped at `max`
    Exponential {
        initial: Duration,
        max: Duration,
        multiplier: f32,
    },
}

impl Backoff {
    /// Delay before the retry that follows failure number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential {
                initial,
                max,
                multiplier,
            } => {
                let exp = attempt.saturating_sub(1).min(31);
                let factor = (*multiplier as f64).powi(exp as i32);
                let delay = initial.mul_f64(factor);
                delay.min(*max)
            }
        }
    }
}

/// What an `approve` decision grants an escalated task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalPolicy {
    /// Attempts reset to zero: a full new automatic cycle, bounded by the
    /// same max_attempts
    FullCycle,
    /// Exactly one more automatic attempt before re-escalation
    SingleAttempt,
}

/// Retry policy for the dispatch state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Failures tolerated before escalation; must be at least 1
    pub max_attempts: u32,
    pub backoff: Backoff,
}

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub retry: RetryPolicy,
    pub approval: ApprovalPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy {
                max_attempts: 3,
                backoff: Backoff::Exponential {
                    initial: Duration::from_millis(250),
                    max: Duration::from_secs(5),
                    multiplier: 2.0,
                },
            },
            approval: ApprovalPolicy::FullCycle,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(ForemanError::Config) if invalid.
    pub fn validate(&self) -> ForemanResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts".to_string(),
                value: self.retry.max_attempts.to_string(),
                reason: "max_attempts must be at least 1".to_string(),
            }
            .into());
        }

        match &self.retry.backoff {
            Backoff::Fixed(_) => {}
            Backoff::Exponential {
                initial,
                max,
                multiplier,
            } => {
                if *multiplier <= 1.0 {
                    return Err(ConfigError::InvalidValue {
                        field: "retry.backoff.multiplier".to_string(),
                        value: multiplier.to_string(),
                        reason: "multiplier must be greater than 1.0".to_string(),
                    }
                    .into());
                }
                if max < initial {
                    return Err(ConfigError::InvalidValue {
                        field: "retry.backoff.max".to_string(),
                        value: format!("{:?}", max),
                        reason: "max must be at least the initial delay".to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ForemanError;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_max_attempts_rejected() {
        let mut config = EngineConfig::default();
        config.retry.max_attempts = 0;
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ForemanError::Config(ConfigError::InvalidValue { field, .. }))
                if field == "retry.max_attempts"
        ));
    }

    #[test]
    fn test_flat_multiplier_rejected() {
        let mut config = EngineConfig::default();
        config.retry.backoff = Backoff::Exponential {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(1),
            multiplier: 1.0,
        };
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ForemanError::Config(ConfigError::InvalidValue { field, .. }))
                if field == "retry.backoff.multiplier"
        ));
    }

    #[test]
    fn test_fixed_backoff_delay() {
        let backoff = Backoff::Fixed(Duration::from_millis(500));
        assert_eq!(backoff.delay_for(1), Duration::from_millis(500));
        assert_eq!(backoff.delay_for(7), Duration::from_millis(500));
    }

    #[test]
    fn test_exponential_backoff_grows_and_caps() {
        let backoff = Backoff::Exponential {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(450),
            multiplier: 2.0,
        };
        assert_eq!(backoff.delay_for(1), Duration::from_millis(100));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(200));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(400));
        // Capped at max
        assert_eq!(backoff.delay_for(4), Duration::from_millis(450));
        assert_eq!(backoff.delay_for(30), Duration::from_millis(450));
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Exponential delays never exceed the configured max.
        #[test]
        fn prop_exponential_backoff_bounded(
            initial_ms in 1u64..1_000,
            max_ms in 1_000u64..60_000,
            attempt in 1u32..64,
        ) {
            let backoff = Backoff::Exponential {
                initial: Duration::from_millis(initial_ms),
                max: Duration::from_millis(max_ms),
                multiplier: 2.0,
            };
            prop_assert!(backoff.delay_for(attempt) <= Duration::from_millis(max_ms));
        }

        /// Any max_attempts >= 1 with the default backoff validates.
        #[test]
        fn prop_positive_max_attempts_valid(max_attempts in 1u32..1_000) {
            let mut config = EngineConfig::default();
            config.retry.max_attempts = max_attempts;
            prop_assert!(config.validate().is_ok());
        }
    }
}
