//! Client configuration.
//!
//! Loaded from TOML; every field is optional and falls back to
//! [`ClientConfig::default`].
//!
//! ```toml
//! commitment = "confirmed"
//! nonce_commitment = "finalized"
//! default_decimals = 6
//! ```

use {
    serde::{Deserialize, Serialize},
    solana_commitment_config::CommitmentLevel,
    std::{
        fs,
        path::{Path, PathBuf},
    },
    thiserror::Error,
};

/// Largest decimal count whose scale factor fits in a `u64`.
pub const MAX_DECIMALS: u8 = 19;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Level every submitted transaction is confirmed to before returning.
    /// Default: confirmed.
    pub commitment: CommitmentLevel,

    /// Level nonce values are read at, and nonce accounts are confirmed to
    /// when created.
    /// Default: finalized.
    pub nonce_commitment: CommitmentLevel,

    /// Decimals of newly created mints.
    /// Default: 6.
    pub default_decimals: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            commitment: CommitmentLevel::Confirmed,
            nonce_commitment: CommitmentLevel::Finalized,
            default_decimals: 6,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Level a nonce-bound transaction is confirmed to: the stronger of
    /// `commitment` and `nonce_commitment`, so the advanced value is already
    /// visible to the next read at `nonce_commitment`.
    pub fn nonce_submit_commitment(&self) -> CommitmentLevel {
        if rank(self.nonce_commitment) > rank(self.commitment) {
            self.nonce_commitment
        } else {
            self.commitment
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_decimals > MAX_DECIMALS {
            return Err(ConfigError::InvalidDecimals(self.default_decimals));
        }
        Ok(())
    }
}

fn rank(level: CommitmentLevel) -> u8 {
    match level {
        CommitmentLevel::Processed => 0,
        CommitmentLevel::Confirmed => 1,
        CommitmentLevel::Finalized => 2,
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid client config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("default_decimals = {0} exceeds {MAX_DECIMALS}")]
    InvalidDecimals(u8),
}
