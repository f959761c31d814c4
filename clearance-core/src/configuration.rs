//! Deployment configuration.
//!
//! Loaded from JSON. Every field but `accumulator_seed` is optional; the seed
//! is the deployment secret all accumulator trapdoors derive from, so it has
//! no default and must stay private to the deployment:
//!
//! ```json
//! {
//!     "level_count": 5,
//!     "ordering": "ascending",
//!     "abe_mode": "multi",
//!     "accumulator_seed": "deployment secret"
//! }
//! ```

use crate::{
    abe::AbeMode,
    policy::{self, LevelHierarchy, LevelOrdering, MAX_LEVELS},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Policy(#[from] policy::Error),

    #[error("accumulator seed must be configured")]
    MissingSeed,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClearanceConfiguration {
    /// Number of security levels, between 3 and 5.
    pub level_count: u8,
    pub ordering: LevelOrdering,
    pub abe_mode: AbeMode,
    /// Secret every accumulator key is derived from. Empty until configured.
    pub accumulator_seed: String,
}

impl Default for ClearanceConfiguration {
    fn default() -> Self {
        Self {
            level_count: MAX_LEVELS,
            ordering: LevelOrdering::default(),
            abe_mode: AbeMode::default(),
            accumulator_seed: String::new(),
        }
    }
}

impl std::fmt::Debug for ClearanceConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClearanceConfiguration")
            .field("level_count", &self.level_count)
            .field("ordering", &self.ordering)
            .field("abe_mode", &self.abe_mode)
            .field("accumulator_seed", &"<redacted>")
            .finish()
    }
}

impl ClearanceConfiguration {
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.hierarchy()?;
        if self.accumulator_seed.trim().is_empty() {
            return Err(ConfigurationError::MissingSeed);
        }
        Ok(())
    }

    pub fn hierarchy(&self) -> Result<LevelHierarchy, policy::Error> {
        LevelHierarchy::new(self.level_count, self.ordering)
    }
}
