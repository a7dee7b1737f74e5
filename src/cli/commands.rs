use crate::application::list_view::ListQuery;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tradejournal", about = "Trading journal: trades, positions, notes and AI insights")]
pub struct Cli {
    /// Use a throwaway in-process backend instead of the REST API
    #[arg(long, global = true)]
    pub offline: bool,
    #[command(subcommand)]
    pub command: Commands,
}

/// Filter and paging flags shared by the list commands. Flags override
/// whatever `--query` carries.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// URL query string, e.g. "page=2&per_page=25&type=Swing"
    #[arg(long)]
    pub query: Option<String>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub per_page: Option<u32>,
    #[arg(long)]
    pub search: Option<String>,
    /// Trading type (Swing, Day) for trades; entry type (general, trade_specific) for journal
    #[arg(long = "type")]
    pub kind: Option<String>,
    /// OPEN or CLOSED
    #[arg(long)]
    pub status: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

fn parse_day(raw: &Option<String>) -> Result<Option<NaiveDate>, String> {
    raw.as_deref()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| format!("Invalid date format: {s}. Use YYYY-MM-DD"))
        })
        .transpose()
}

impl ListArgs {
    pub fn to_query(&self) -> Result<ListQuery, String> {
        let mut query = ListQuery::from_query_string(self.query.as_deref().unwrap_or(""));
        if self.search.is_some() {
            query = query.with_search(self.search.clone());
        }
        if self.kind.is_some() {
            query = query.with_kind(self.kind.clone());
        }
        if self.status.is_some() {
            query = query.with_status(self.status.clone());
        }
        if self.from.is_some() || self.to.is_some() {
            let from = parse_day(&self.from)?.or(query.date_from);
            let to = parse_day(&self.to)?.or(query.date_to);
            query = query.with_dates(from, to);
        }
        if let Some(per_page) = self.per_page {
            query = query.with_per_page(per_page);
        }
        if let Some(page) = self.page {
            query = query.with_page(page);
        }
        Ok(query)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Signup {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Log in and remember the session
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the current session
    Logout,
    /// Show the logged-in user and plan
    Whoami,
    /// Confirm an email address with the token from the confirmation email
    ConfirmEmail { token: String },
    /// Send the confirmation email again
    ResendConfirmation { email: String },
    /// Change the account password
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// List trades
    Trades {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one trade with its journal notes
    Trade { id: String },
    /// Add a trade
    TradeAdd {
        /// JSON with date, ticker_symbol, number_of_shares, buy_price, sell_price, trading_type
        json: String,
    },
    /// Update fields of a trade
    TradeUpdate {
        id: String,
        /// JSON with any of the trade-add fields
        json: String,
    },
    /// Delete a trade
    TradeDelete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List positions as the backend tracks them
    Positions {
        /// OPEN or CLOSED
        #[arg(long)]
        status: Option<String>,
        /// Symbol substring
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Show a position and its trades
    Position { id: String },
    /// Delete a position and every trade in it
    PositionDelete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Rebuild positions locally from trades
    DerivePositions {
        #[arg(long)]
        symbol: Option<String>,
    },
    /// List journal entries
    Journal {
        #[command(flatten)]
        list: ListArgs,
        /// Only entries linked to this trade
        #[arg(long)]
        trade_id: Option<String>,
    },
    /// Add a journal entry
    JournalAdd {
        /// JSON with date, notes and optional trade_id
        json: String,
    },
    /// Update a journal entry
    JournalUpdate { id: String, json: String },
    /// Delete a journal entry
    JournalDelete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Show stored AI insights and whether a refresh is allowed
    Insights,
    /// Generate fresh AI insights
    InsightsRefresh,
    /// Dashboard statistics
    Stats {
        /// Swing or Day
        #[arg(long = "type")]
        trading_type: Option<String>,
    },
    /// Dashboard chart data
    Chart {
        #[arg(long = "type")]
        trading_type: Option<String>,
    },
    /// Stats split by trading type
    TypeStats,
    /// Import a brokerage statement
    Upload {
        path: String,
        #[arg(long, default_value = "thinkorswim")]
        platform: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_query_string() {
        let args = ListArgs {
            query: Some("page=3&per_page=25&type=Day".into()),
            kind: Some("Swing".into()),
            ..Default::default()
        };
        let query = args.to_query().unwrap();
        assert_eq!(query.kind.as_deref(), Some("Swing"));
        assert_eq!(query.per_page, 25);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn bad_date_is_rejected() {
        let args = ListArgs {
            from: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(args.to_query().is_err());
    }

    #[test]
    fn cli_parses_global_offline_flag() {
        let cli = Cli::try_parse_from(["tradejournal", "trades", "--offline", "--page", "2"]).unwrap();
        assert!(cli.offline);
        assert!(matches!(cli.command, Commands::Trades { .. }));
    }
}
