//! Opaque key tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The keycode written into target cells that have no source key.
pub const NO_KEY: &str = "KC_NO";

/// One key assignment as it appears in the source text.
///
/// The token is never interpreted: `KC_A`, `TD(DANCE_0)` and
/// `MT(MOD_LSFT, KC_BSLS)` are all just strings that get relocated.
/// Whitespace runs inside the token are collapsed to one space so that
/// expressions split across lines render on a single line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalKey(String);

impl LogicalKey {
    /// Creates a key from raw cell text.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let collapsed = raw.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
        Self(collapsed)
    }

    /// The explicit "no key" placeholder.
    #[must_use]
    pub fn placeholder() -> Self {
        Self(NO_KEY.to_string())
    }

    /// Returns the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `KC_NO` and its `XXXXXXX` alias.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0 == NO_KEY || self.0 == "XXXXXXX"
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogicalKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
