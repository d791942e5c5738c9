use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Build/runtime environment the guard runs in.
///
/// Fixed at startup. Drives logger output, credential tier selection and
/// how much of an error is shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    #[default]
    Development,
    Production,
}

impl AppMode {
    pub fn is_production(&self) -> bool {
        matches!(self, AppMode::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, AppMode::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppMode::Development => "development",
            AppMode::Production => "production",
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppMode::Development),
            "production" | "prod" => Ok(AppMode::Production),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}
