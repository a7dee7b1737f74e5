use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    TradeSpecific,
    #[default]
    General,
}

impl EntryType {
    /// Entries linked to a trade are trade-specific, everything else is general.
    pub fn for_trade_id(trade_id: Option<&str>) -> Self {
        match trade_id {
            Some(id) if !id.trim().is_empty() => EntryType::TradeSpecific,
            _ => EntryType::General,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::TradeSpecific => write!(f, "trade_specific"),
            EntryType::General => write!(f, "general"),
        }
    }
}

impl FromStr for EntryType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trade_specific" | "trade-specific" | "trade" => Ok(EntryType::TradeSpecific),
            "general" => Ok(EntryType::General),
            _ => Err(format!("Unknown entry type: {s}")),
        }
    }
}
