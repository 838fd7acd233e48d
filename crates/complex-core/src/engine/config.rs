use crate::core::composition::key::KEY_DELIMITER;
use thiserror::Error;

/// Prefix of identifiers assigned to finalized complexes.
pub const DEFAULT_ID_PREFIX: &str = "PDB-CPX-";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub id_prefix: String,
    /// Ignore participation rows of non-preferred assemblies.
    pub preferred_assemblies_only: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            preferred_assemblies_only: true,
        }
    }
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    id_prefix: Option<String>,
    preferred_assemblies_only: Option<bool>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    pub fn preferred_assemblies_only(mut self, only: bool) -> Self {
        self.preferred_assemblies_only = Some(only);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let id_prefix = self
            .id_prefix
            .ok_or(ConfigError::MissingParameter("id_prefix"))?;
        if id_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "id_prefix",
                reason: "must not be empty".to_string(),
            });
        }
        if id_prefix.contains(KEY_DELIMITER) || id_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidParameter {
                name: "id_prefix",
                reason: format!("must not contain whitespace or '{KEY_DELIMITER}'"),
            });
        }

        Ok(AnalysisConfig {
            id_prefix,
            preferred_assemblies_only: self.preferred_assemblies_only.unwrap_or(true),
        })
    }
}
