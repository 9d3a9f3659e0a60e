//! Bank configuration.

/// Largest compute budget a transaction can request.
pub const MAX_COMPUTE_UNIT_LIMIT: u64 = 1_400_000;

/// Configuration for a [`crate::Bank`].
#[derive(Debug, Clone)]
pub struct BankConfig {
    /// Compute units available to one transaction across all instructions.
    /// Default: 1_400_000.
    pub compute_unit_limit: u64,

    /// Worker threads of the runtime the bank runs on.
    /// Default: 2.
    pub worker_threads: usize,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            compute_unit_limit: MAX_COMPUTE_UNIT_LIMIT,
            worker_threads: 2,
        }
    }
}

impl BankConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compute_unit_limit == 0 || self.compute_unit_limit > MAX_COMPUTE_UNIT_LIMIT {
            return Err(ConfigError::InvalidComputeUnitLimit(self.compute_unit_limit));
        }
        if self.worker_threads == 0 {
            return Err(ConfigError::InvalidWorkerThreads);
        }
        Ok(())
    }
}

/// Errors in bank configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("compute_unit_limit ({0}) must be in 1..={MAX_COMPUTE_UNIT_LIMIT}")]
    InvalidComputeUnitLimit(u64),
    #[error("worker_threads must be > 0")]
    InvalidWorkerThreads,
}

#[cfg(test)]
mod tests {
    use {super::*, assert_matches::assert_matches, test_case::test_case};

    #[test]
    fn test_default_config() {
        let config = BankConfig::default();
        assert_eq!(config.compute_unit_limit, 1_400_000);
        assert!(config.validate().is_ok());
    }

    #[test_case(0; "zero")]
    #[test_case(1_400_001; "above the maximum")]
    fn test_invalid_compute_unit_limit(compute_unit_limit: u64) {
        let config = BankConfig {
            compute_unit_limit,
            ..BankConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::InvalidComputeUnitLimit(limit)) if limit == compute_unit_limit
        );
    }

    #[test]
    fn test_invalid_worker_threads() {
        let config = BankConfig {
            worker_threads: 0,
            ..BankConfig::default()
        };
        assert_matches!(config.validate(), Err(ConfigError::InvalidWorkerThreads));
    }
}
