//! Output profiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which firmware flavour the conversion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Folded 8×6 matrix with Vial support
    #[default]
    Vial,
    /// Stock QMK `LAYOUT_planck_grid`, no Vial
    Plain,
}

impl Profile {
    /// Lowercase identifier used in config files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vial => "vial",
            Self::Plain => "plain",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vial" => Ok(Self::Vial),
            "plain" => Ok(Self::Plain),
            other => Err(format!("Unknown profile '{other}' (expected vial or plain)")),
        }
    }
}
