//! thinkorswim account statement parsing.

use chrono::{NaiveDate, NaiveDateTime};

const TRADE_HISTORY: &str = "Account Trade History";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

/// One execution from the trade history section.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub date: NaiveDate,
    pub symbol: String,
    pub side: Side,
    pub quantity: i64,
    pub price: f64,
}

fn parse_exec_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for fmt in ["%m/%d/%y %H:%M:%S", "%m/%d/%Y %H:%M:%S", "%m/%d/%y %H:%M", "%m/%d/%Y %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    ["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_start_matches('+')
        .replace(',', "")
        .parse::<f64>()
        .ok()
}

/// Extract fills from the "Account Trade History" section. The section ends
/// where the next one starts; rows without a symbol, side or date are skipped.
pub fn parse_thinkorswim(contents: &[u8]) -> Result<Vec<Fill>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| format!("Failed to parse statement row {}: {e}", idx + 1))?;
        rows.push(record.iter().map(String::from).collect());
    }

    let start = rows
        .iter()
        .position(|row| row.iter().any(|cell| cell.contains(TRADE_HISTORY)))
        .ok_or_else(|| format!("No '{TRADE_HISTORY}' section found."))?;
    let Some(headers) = rows.get(start + 1) else {
        return Ok(Vec::new());
    };
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let (Some(time_col), Some(side_col), Some(qty_col), Some(symbol_col), Some(price_col)) = (
        column("Exec Time"),
        column("Side"),
        column("Qty"),
        column("Symbol"),
        column("Price"),
    ) else {
        return Err("Trade history is missing Exec Time, Side, Qty, Symbol or Price columns.".into());
    };

    let mut fills = Vec::new();
    for row in &rows[start + 2..] {
        // Blank lines are dropped by the reader, so the next section's
        // one-cell title row is what ends this one.
        if row.iter().all(|cell| cell.is_empty()) || row.len() < 2 {
            break;
        }
        let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
        let side = match cell(side_col).to_uppercase().as_str() {
            "BUY" => Side::Buy,
            "SELL" => Side::Sell,
            _ => continue,
        };
        let symbol = cell(symbol_col).to_uppercase();
        let Some(date) = parse_exec_date(cell(time_col)) else { continue };
        let quantity = parse_number(cell(qty_col)).map(|q| q.abs().round() as i64).unwrap_or(0);
        let price = parse_number(cell(price_col)).unwrap_or(0.0);
        if symbol.is_empty() || quantity == 0 {
            continue;
        }
        fills.push(Fill {
            date,
            symbol,
            side,
            quantity,
            price,
        });
    }
    Ok(fills)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATEMENT: &str = "\
Account Statement for 123456789 since 1/1/26 through 1/31/26

Account Trade History
,Exec Time,Spread,Side,Qty,Pos Effect,Symbol,Exp,Strike,Type,Price,Net Price,Order Type
,1/05/26 09:31:02,STOCK,BUY,+10,TO OPEN,ABC,,,STOCK,10.00,10.00,LMT
,1/06/26 10:02:11,STOCK,BUY,\"+1,000\",TO OPEN,xyz,,,STOCK,2.50,2.50,MKT
,1/10/26 15:45:00,STOCK,SELL,-10,TO CLOSE,ABC,,,STOCK,12.00,12.00,LMT

Profits and Losses
";

    #[test]
    fn reads_trade_history_until_next_section() {
        let fills = parse_thinkorswim(STATEMENT.as_bytes()).unwrap();
        assert_eq!(fills.len(), 3);
        assert_eq!(fills[0].date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(fills[1].symbol, "XYZ");
        assert_eq!(fills[1].quantity, 1000);
        assert_eq!(fills[2].side, Side::Sell);
        assert_eq!(fills[2].quantity, 10);
    }

    #[test]
    fn missing_section_is_an_error() {
        let err = parse_thinkorswim(b"Cash Balance\n,DATE,TIME\n").unwrap_err();
        assert!(err.contains("Account Trade History"));
    }
}
