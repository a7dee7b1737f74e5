use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend verdict on a trade. Open legs are `Pending` until they close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinLoss {
    Win,
    Loss,
    Pending,
}

impl fmt::Display for WinLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinLoss::Win => write!(f, "Win"),
            WinLoss::Loss => write!(f, "Loss"),
            WinLoss::Pending => write!(f, "Pending"),
        }
    }
}

impl FromStr for WinLoss {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "win" => Ok(WinLoss::Win),
            "loss" => Ok(WinLoss::Loss),
            "pending" => Ok(WinLoss::Pending),
            _ => Err(format!("Unknown win/loss value: {s}")),
        }
    }
}
