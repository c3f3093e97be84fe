use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Upper bound on pipeline rounds while waiting for a fixpoint
    pub max_rounds: usize,

    /// Optimize batches on the rayon thread pool
    pub parallel: bool,

    /// Log every pass run and the fixpoint summary
    pub trace: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_rounds: 8,
            parallel: true,
            trace: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max_rounds must be at least 1")]
    ZeroRounds,
}

impl OptimizerConfig {
    /// Parse OptimizerConfig from a TOML string and validate it
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let config: OptimizerConfig = toml::from_str(toml_str)?;

        if config.max_rounds == 0 {
            return Err(ConfigError::ZeroRounds.into());
        }

        Ok(config)
    }
}
