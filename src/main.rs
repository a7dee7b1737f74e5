use chrono::Utc;
use clap::Parser;
use log::warn;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tradejournal::application::insights::InsightsPanel;
use tradejournal::application::journal::JournalForm;
use tradejournal::application::list_view::ListQuery;
use tradejournal::application::trade::TradeForm;
use tradejournal::cli::commands::{Cli, Commands};
use tradejournal::config::Config;
use tradejournal::domain::ports::trade_api::TradeFilter;
use tradejournal::domain::values::trading_type::TradingType;
use tradejournal::TradeJournal;

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let journal = match build(cli.offline) {
        Ok(journal) => journal,
        Err(e) => {
            eprintln!("Error initializing TradeJournal: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = journal.restore().await {
        warn!("could not restore session: {e}");
    }

    if let Err(e) = run_command(journal, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn build(offline: bool) -> Result<TradeJournal, Box<dyn std::error::Error>> {
    if offline {
        return Ok(TradeJournal::in_memory()?.0);
    }
    let config = Config::from_env()?;
    Ok(TradeJournal::new(&config)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_insights(panel: &InsightsPanel) -> Result<(), Box<dyn std::error::Error>> {
    let sections: Vec<serde_json::Value> = panel
        .insights
        .as_ref()
        .map(|i| i.sections())
        .unwrap_or_default()
        .into_iter()
        .map(|(title, items)| serde_json::json!({ "title": title, "items": items }))
        .collect();
    print_json(&serde_json::json!({ "panel": panel, "sections": sections }))
}

fn confirm(prompt: &str, yes: bool) -> Result<bool, Box<dyn std::error::Error>> {
    if yes {
        return Ok(true);
    }
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn trading_type(raw: Option<String>) -> Result<Option<TradingType>, String> {
    raw.map(|t| t.parse()).transpose()
}

async fn run_command(tj: TradeJournal, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Signup {
            email,
            password,
            confirm,
        } => {
            let receipt = tj.signup(&email, &password, &confirm).await?;
            print_json(&receipt)?;
        }
        Commands::Login { email, password } => {
            let session = tj.login(&email, &password).await?;
            print_json(&session.user)?;
        }
        Commands::Logout => {
            tj.logout().await?;
            println!("Logged out");
        }
        Commands::Whoami => {
            let user = tj.whoami().await?;
            print_json(&user)?;
        }
        Commands::ConfirmEmail { token } => {
            println!("{}", tj.confirm_email(&token).await?);
        }
        Commands::ResendConfirmation { email } => {
            println!("{}", tj.resend_confirmation(&email).await?);
        }
        Commands::ChangePassword {
            current,
            new,
            confirm,
        } => {
            println!("{}", tj.change_password(&current, &new, &confirm).await?);
        }
        Commands::Trades { list } => {
            let page = tj.trades(&list.to_query()?).await?;
            print_json(&page)?;
        }
        Commands::Trade { id } => {
            let trade = tj.trade(&id).await?;
            let notes = tj.journal_for_trade(&id).await?;
            print_json(&serde_json::json!({ "trade": trade, "journal": notes }))?;
        }
        Commands::TradeAdd { json } => {
            let form: TradeForm = serde_json::from_str(&json)?;
            let trade = tj.trade_add(&form).await?;
            print_json(&trade)?;
        }
        Commands::TradeUpdate { id, json } => {
            let form: TradeForm = serde_json::from_str(&json)?;
            let trade = tj.trade_update(&id, &form).await?;
            print_json(&trade)?;
        }
        Commands::TradeDelete { id, yes } => {
            if confirm(&format!("Delete trade {id}?"), yes)? {
                tj.trade_delete(&id).await?;
                println!("Trade {id} deleted");
            }
        }
        Commands::Positions { status, symbol } => {
            let query = ListQuery::default().with_status(status).with_search(symbol);
            let positions = tj.positions(&query.position_filter()?).await?;
            print_json(&positions)?;
        }
        Commands::Position { id } => {
            let detail = tj.position(&id).await?;
            print_json(&detail)?;
        }
        Commands::PositionDelete { id, yes } => {
            if confirm(&format!("Delete position {id} and all of its trades?"), yes)? {
                println!("{}", tj.position_delete(&id).await?);
            }
        }
        Commands::DerivePositions { symbol } => match symbol {
            Some(symbol) => print_json(&tj.derive_position(&symbol).await?)?,
            None => print_json(&tj.derive_positions(&TradeFilter::default()).await?)?,
        },
        Commands::Journal { list, trade_id } => match trade_id {
            Some(trade_id) => print_json(&tj.journal_for_trade(&trade_id).await?)?,
            None => print_json(&tj.journal(&list.to_query()?).await?)?,
        },
        Commands::JournalAdd { json } => {
            let form: JournalForm = serde_json::from_str(&json)?;
            print_json(&tj.journal_add(&form).await?)?;
        }
        Commands::JournalUpdate { id, json } => {
            let form: JournalForm = serde_json::from_str(&json)?;
            print_json(&tj.journal_update(&id, &form).await?)?;
        }
        Commands::JournalDelete { id, yes } => {
            if confirm(&format!("Delete journal entry {id}?"), yes)? {
                tj.journal_delete(&id).await?;
                println!("Journal entry {id} deleted");
            }
        }
        Commands::Insights => {
            print_insights(&tj.insights(Utc::now()).await?)?;
        }
        Commands::InsightsRefresh => {
            print_insights(&tj.insights_refresh(Utc::now()).await?)?;
        }
        Commands::Stats { trading_type: tt } => {
            print_json(&tj.stats(trading_type(tt)?).await?)?;
        }
        Commands::Chart { trading_type: tt } => {
            print_json(&tj.chart(trading_type(tt)?).await?)?;
        }
        Commands::TypeStats => {
            print_json(&tj.type_stats().await?)?;
        }
        Commands::Upload { path, platform } => {
            let summary = tj.upload(&platform, Path::new(&path)).await?;
            print_json(&summary)?;
        }
    }
    Ok(())
}
