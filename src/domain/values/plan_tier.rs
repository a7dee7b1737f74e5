use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Premium,
    Pro,
}

impl PlanTier {
    /// Days between insight generations on this tier.
    pub fn cooldown_days(&self) -> i64 {
        match self {
            PlanTier::Free => 30,
            PlanTier::Premium => 7,
            PlanTier::Pro => 1,
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanTier::Free => write!(f, "free"),
            PlanTier::Premium => write!(f, "premium"),
            PlanTier::Pro => write!(f, "pro"),
        }
    }
}

impl FromStr for PlanTier {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "premium" => Ok(PlanTier::Premium),
            "pro" => Ok(PlanTier::Pro),
            _ => Err(format!("Unknown plan: {s}")),
        }
    }
}
