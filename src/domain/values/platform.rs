use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Brokerage whose statement export can be imported. Only thinkorswim
/// account statements are understood by the backend today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Thinkorswim,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Thinkorswim => write!(f, "thinkorswim"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "thinkorswim" | "tos" => Ok(Platform::Thinkorswim),
            _ => Err(format!("Only Thinkorswim supported for now, got: {s}")),
        }
    }
}
