//! Enforcement mode annotation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StageError;

/// AppArmor enforcement level recorded in a fragment's first line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Enforce the profile rules.
    #[default]
    Enforce,
    /// Log violations without enforcing.
    Complain,
    /// Disable the profile.
    Disable,
}

impl Mode {
    /// Returns the literal used in the on-disk annotation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enforce => "enforce",
            Self::Complain => "complain",
            Self::Disable => "disable",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enforce" => Ok(Self::Enforce),
            "complain" => Ok(Self::Complain),
            "disable" => Ok(Self::Disable),
            other => Err(StageError::Configuration(format!(
                "value of mode must be one of: enforce, complain, disable, got: {other}"
            ))),
        }
    }
}
