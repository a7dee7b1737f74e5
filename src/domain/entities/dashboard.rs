use crate::domain::values::platform::Platform;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_trades: u64,
    #[serde(default)]
    pub win_count: u64,
    #[serde(default)]
    pub loss_count: u64,
    #[serde(default)]
    pub win_rate: f64,
    #[serde(default)]
    pub total_profit_loss: f64,
    #[serde(default)]
    pub avg_profit_loss: f64,
    #[serde(default)]
    pub recent_profit_loss: f64,
    #[serde(default)]
    pub recent_trades_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(default, rename = "backgroundColor", skip_serializing_if = "Vec::is_empty")]
    pub background_color: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardCharts {
    #[serde(default)]
    pub donut_chart: ChartData,
    #[serde(default)]
    pub line_chart: ChartData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingTypeStats {
    #[serde(default)]
    pub total_trades: u64,
    #[serde(default)]
    pub win_count: u64,
    #[serde(default)]
    pub loss_count: u64,
    #[serde(default)]
    pub total_profit_loss: f64,
    #[serde(default)]
    pub win_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingTypeBreakdown {
    #[serde(default)]
    pub swing_stats: TradingTypeStats,
    #[serde(default)]
    pub day_stats: TradingTypeStats,
}

/// A brokerage statement ready to be sent as multipart form data.
#[derive(Debug, Clone)]
pub struct StatementUpload {
    pub platform: Platform,
    pub file_name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadSummary {
    #[serde(default)]
    pub num_trades: u64,
    #[serde(default)]
    pub closed_trades_count: u64,
    #[serde(default)]
    pub day_trades: u64,
    #[serde(default)]
    pub swing_trades: u64,
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub pnl_by_symbol: HashMap<String, f64>,
    #[serde(default)]
    pub total_pnl: f64,
    #[serde(default)]
    pub new_positions: u64,
    #[serde(default)]
    pub closed_positions: u64,
    #[serde(default)]
    pub open_positions_count: u64,
}
