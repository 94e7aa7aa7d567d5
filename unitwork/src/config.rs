//! Engine configuration.

use crate::UowResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default limit on nested-entity depth while snapshotting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// What the command bus does when a definition lacks the handler a command needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchPolicy {
    #[default]
    /// Skip the command.
    Silent,
    /// Fail with `MissingHandler`.
    Strict,
}

impl fmt::Display for DispatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => f.write_str("silent"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// Settings for a [`UnitOfWork`](crate::UnitOfWork).
///
/// Parsed from TOML:
///
/// ```toml
/// dispatch_policy = "strict"
/// max_depth = 8
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOfWorkConfig {
    #[serde(default)]
    pub dispatch_policy: DispatchPolicy,
    /// Deepest level of nested entities a snapshot may descend to.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for UnitOfWorkConfig {
    fn default() -> Self {
        Self {
            dispatch_policy: DispatchPolicy::default(),
            max_depth: default_max_depth(),
        }
    }
}

impl UnitOfWorkConfig {
    /// Parses a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> UowResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    #[must_use]
    pub fn with_dispatch_policy(mut self, policy: DispatchPolicy) -> Self {
        self.dispatch_policy = policy;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
