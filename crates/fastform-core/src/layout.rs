//! Form layout direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FastFormError;

/// How a container arranges labels and inputs.
///
/// Serialized in lowercase (`"horizontal"` / `"vertical"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Labels beside their inputs.
    #[default]
    Horizontal,
    /// Labels above their inputs.
    Vertical,
}

impl Layout {
    /// Returns the lowercase name of this layout.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = FastFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            other => Err(FastFormError::ConfigurationError(format!(
                "Unknown layout '{other}', expected 'horizontal' or 'vertical'"
            ))),
        }
    }
}
