use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Runtime behaviour of chain execution.
///
/// ```json
/// { "onStepFailure": "continueChain", "stepTimeout": 5000, "chainTimeout": 30000 }
/// ```
///
/// Timeouts are in milliseconds; an absent timeout means no limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    #[serde(default, alias = "on_step_failure")]
    pub on_step_failure: StepFailurePolicy,

    #[serde(default, alias = "step_timeout", with = "optional_duration_ms")]
    pub step_timeout: Option<Duration>,

    #[serde(default, alias = "chain_timeout", with = "optional_duration_ms")]
    pub chain_timeout: Option<Duration>,
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, timeout) in [
            ("stepTimeout", self.step_timeout),
            ("chainTimeout", self.chain_timeout),
        ] {
            if timeout.is_some_and(|t| t.is_zero()) {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }

    pub fn with_policy(mut self, policy: StepFailurePolicy) -> Self {
        self.on_step_failure = policy;
        self
    }

    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    pub fn with_chain_timeout(mut self, timeout: Duration) -> Self {
        self.chain_timeout = Some(timeout);
        self
    }
}

/// What a chain does after one of its steps fails.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum StepFailurePolicy {
    /// Stop the remaining steps of the failing chain.
    #[default]
    Abort,
    /// Record the failure and keep going.
    ContinueChain,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Parses and validates a JSON runtime configuration.
pub fn from_str(s: &str) -> Result<RuntimeConfig, ConfigError> {
    let config: RuntimeConfig = serde_json::from_str(s)?;
    config.validate()?;
    Ok(config)
}

mod optional_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults() {
        let config = from_str("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.on_step_failure, StepFailurePolicy::Abort);
        assert_eq!(config.step_timeout, None);
    }

    #[test]
    fn test_full_config() {
        let config = from_str(
            r#"{ "onStepFailure": "continueChain", "stepTimeout": 250, "chainTimeout": 1000 }"#,
        )
        .unwrap();
        assert_eq!(config.on_step_failure, StepFailurePolicy::ContinueChain);
        assert_eq!(config.step_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.chain_timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_snake_case_alias() {
        let config = from_str(r#"{ "on_step_failure": "continueChain" }"#).unwrap();
        assert_eq!(config.on_step_failure, StepFailurePolicy::ContinueChain);
    }

    #[test]
    fn test_rejects_unknown_policy() {
        assert!(matches!(
            from_str(r#"{ "onStepFailure": "retry" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        assert!(matches!(
            from_str(r#"{ "stepTimeout": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_policy_spelling() {
        assert_eq!(StepFailurePolicy::ContinueChain.to_string(), "continueChain");
        assert_eq!(
            StepFailurePolicy::from_str("abort").unwrap(),
            StepFailurePolicy::Abort
        );
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = RuntimeConfig::default().with_step_timeout(Duration::from_millis(40));
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(from_str(&json).unwrap(), config);
    }
}
