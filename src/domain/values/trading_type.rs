use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradingType {
    Swing,
    Day,
}

impl fmt::Display for TradingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradingType::Swing => write!(f, "Swing"),
            TradingType::Day => write!(f, "Day"),
        }
    }
}

impl FromStr for TradingType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "swing" => Ok(TradingType::Swing),
            "day" => Ok(TradingType::Day),
            _ => Err(format!("Trading type must be either \"Swing\" or \"Day\", got: {s}")),
        }
    }
}
