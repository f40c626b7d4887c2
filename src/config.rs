//! Options controlling how references are recorded.

use std::env;

/// Environment variable that turns on [`StoreOptions::absolute_paths`].
pub const ABSOLUTE_PATHS_ENV: &str = "TPD_ABSOLUTE_PATHS";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Record the canonical absolute path of each referenced file instead of
    /// the path as given.
    pub absolute_paths: bool,
}

impl StoreOptions {
    /// Options from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            absolute_paths: env::var(ABSOLUTE_PATHS_ENV)
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    pub fn with_absolute_paths(mut self, on: bool) -> Self {
        self.absolute_paths = on;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
