//! Ledger configuration.

use serde::{Deserialize, Serialize};
use veridb_types::LedgerError;

/// Largest key the ledger accepts, in bytes.
const MAX_KEY_SIZE_CEILING: usize = 64 * 1024;

/// Ledger configuration.
///
/// # Validation Rules
///
/// - `max_key_size` must be >= 1 and <= 64 KiB
/// - `max_value_size` must be >= 1
///
/// # Example
///
/// ```no_run
/// # use veridb_ledger::LedgerConfig;
/// let config = LedgerConfig::builder()
///     .sync_on_append(false)
///     .max_value_size(4 * 1024 * 1024)
///     .build()
///     .expect("valid ledger config");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Flush the entry log to stable storage on every append.
    ///
    /// Disabling trades durability of the latest writes for throughput;
    /// verification is unaffected. Default: true.
    #[serde(default = "default_sync_on_append")]
    pub sync_on_append: bool,
    /// Maximum accepted key size in bytes. Default: 1024.
    #[serde(default = "default_max_key_size")]
    pub max_key_size: usize,
    /// Maximum accepted value size in bytes. Default: 1 MiB.
    #[serde(default = "default_max_value_size")]
    pub max_value_size: usize,
}

#[bon::bon]
impl LedgerConfig {
    /// Creates a new ledger configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] if:
    /// - `max_key_size` is 0 or exceeds 64 KiB
    /// - `max_value_size` is 0
    #[builder]
    pub fn new(
        #[builder(default = default_sync_on_append())] sync_on_append: bool,
        #[builder(default = default_max_key_size())] max_key_size: usize,
        #[builder(default = default_max_value_size())] max_value_size: usize,
    ) -> Result<Self, LedgerError> {
        let config = Self { sync_on_append, max_key_size, max_value_size };
        config.validate()?;
        Ok(config)
    }
}

impl LedgerConfig {
    /// Validates the configuration values.
    ///
    /// Call after deserialization to ensure values are within valid ranges.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] if any value is out of range.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.max_key_size == 0 || self.max_key_size > MAX_KEY_SIZE_CEILING {
            return Err(LedgerError::Config {
                message: format!(
                    "max_key_size must be 1-{MAX_KEY_SIZE_CEILING}, got {}",
                    self.max_key_size
                ),
            });
        }
        if self.max_value_size == 0 {
            return Err(LedgerError::Config {
                message: "max_value_size must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            sync_on_append: default_sync_on_append(),
            max_key_size: default_max_key_size(),
            max_value_size: default_max_value_size(),
        }
    }
}

fn default_sync_on_append() -> bool {
    true
}

fn default_max_key_size() -> usize {
    1024
}

fn default_max_value_size() -> usize {
    1024 * 1024 // 1 MiB
}
