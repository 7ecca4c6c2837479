use crate::data::trade::{AccountMode, Outcome, Side, TradeRecord};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

//accepted input date layouts, normalized to YYYY-MM-DD
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m/%d/%y"];

//column positions resolved from the header row
#[derive(Debug, Default)]
struct Columns {
    id: Option<usize>,
    date: Option<usize>,
    outcome: Option<usize>,
    side: Option<usize>,
    pnl: Option<usize>,
    strategy: Option<usize>,
    notes: Option<usize>,
    instrument: Option<usize>,
    symbol: Option<usize>,
    risk: Option<usize>,
    market: Option<usize>,
    schedule: Option<usize>,
    psychology: Option<usize>,
    mode: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |needles: &[&str]| {
            names
                .iter()
                .position(|name| needles.iter().any(|needle| name.contains(needle)))
        };

        Columns {
            //"side" contains "id", so ids match exactly
            id: names
                .iter()
                .position(|name| matches!(name.as_str(), "id" | "trade id" | "trade_id")),
            date: find(&["date"]),
            outcome: find(&["outcome"]),
            side: find(&["side"]),
            pnl: find(&["p&l", "pnl"]),
            strategy: find(&["strategy"]),
            notes: find(&["notes", "analysis"]),
            instrument: find(&["instrument_type", "inst"]),
            symbol: find(&["symbol"]),
            risk: find(&["risk"]),
            market: find(&["market"]),
            schedule: find(&["schedule"]),
            psychology: find(&["psychology"]),
            mode: find(&["account_mode"]),
        }
    }
}

//non-empty cell at an optional column
fn cell(record: &StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

//cleans broker-formatted pnl: "$1,250.00" -> 1250, "(110.00)" -> -110, junk -> 0
pub fn parse_pnl(raw: &str) -> f64 {
    let mut clean: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    if clean.starts_with('(') && clean.ends_with(')') && clean.len() >= 2 {
        clean = format!("-{}", &clean[1..clean.len() - 1]);
    }

    match clean.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            if !clean.is_empty() {
                warn!(raw, "unparsable pnl, using 0");
            }
            0.0
        }
    }
}

//normalizes an input date to YYYY-MM-DD, or None when no known layout fits
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            //timestamps such as 2024-03-01T14:30:00
            raw.get(0..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })?;
    Some(date.format("%Y-%m-%d").to_string())
}

//loads journal trades from a csv file
pub fn load_csv<P: AsRef<Path>>(path: P, default_mode: AccountMode) -> Result<Vec<TradeRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;
    load_from_reader(file, default_mode)
}

//loads journal trades from any csv source, sorted by trade date then id
pub fn load_from_reader<R: Read>(source: R, default_mode: AccountMode) -> Result<Vec<TradeRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .context("Failed to read CSV header row")?
        .clone();
    let columns = Columns::from_headers(&headers);
    debug!(?columns, "resolved csv columns");

    let mut trades = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let line = index + 2;
        let record = result.context(format!("Failed to parse CSV record at line {}", line))?;

        if record.len() < 3 {
            debug!(line, "skipping short row");
            continue;
        }

        match parse_row(&record, &columns, default_mode, index) {
            Some(trade) => trades.push(trade),
            None => warn!(line, "skipping row with unrecognized side, outcome or account mode"),
        }
    }

    trades.sort_by(|a, b| {
        a.trade_date
            .cmp(&b.trade_date)
            .then_with(|| a.id.cmp(&b.id))
    });

    debug!(count = trades.len(), "loaded trades");
    Ok(trades)
}

fn parse_row(
    record: &StringRecord,
    columns: &Columns,
    default_mode: AccountMode,
    index: usize,
) -> Option<TradeRecord> {
    let id = cell(record, columns.id)
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or(index as i64 + 1);

    let outcome = match cell(record, columns.outcome) {
        Some(raw) => Outcome::parse(raw).ok()?,
        None => Outcome::Be,
    };
    let side = match cell(record, columns.side) {
        Some(raw) => Side::parse(raw).ok()?,
        None => Side::Buy,
    };
    let account_mode = match cell(record, columns.mode) {
        Some(raw) => AccountMode::parse(raw).ok()?,
        None => default_mode,
    };

    let mut pnl = cell(record, columns.pnl).map(parse_pnl).unwrap_or(0.0);
    //a stop loss is always a loss, whatever sign the broker exported
    if outcome == Outcome::Sl {
        pnl = -pnl.abs();
    }

    let trade_date = match cell(record, columns.date) {
        Some(raw) => normalize_date(raw).unwrap_or_else(|| {
            warn!(raw, "unrecognized trade date, keeping it verbatim");
            raw.to_string()
        }),
        None => String::new(),
    };

    let text = |column: Option<usize>, default: &str| {
        cell(record, column)
            .map(str::to_string)
            .unwrap_or_else(|| default.to_string())
    };

    let mut trade = TradeRecord::new(
        id,
        trade_date,
        side,
        outcome,
        text(columns.market, "New York (NY)"),
        text(columns.strategy, "Unknown"),
        pnl,
        account_mode,
    );
    trade.instrument_type = text(columns.instrument, "Future");
    trade.instrument_symbol = text(columns.symbol, "MNQ");
    trade.schedule = text(columns.schedule, "Morning");
    trade.notes = cell(record, columns.notes).map(str::to_string);
    trade.psychology = Some(text(columns.psychology, "Followed Plan"));
    trade.risk_percentage = cell(record, columns.risk)
        .and_then(|raw| raw.trim_end_matches('%').parse::<f64>().ok())
        .unwrap_or(1.0);

    Some(trade)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pnl_cleanup() {
        assert_eq!(parse_pnl("$1,250.00"), 1250.0);
        assert_eq!(parse_pnl("(110.00)"), -110.0);
        assert_eq!(parse_pnl("$(45.50)"), -45.5);
        assert_eq!(parse_pnl(" -12 "), -12.0);
        assert_eq!(parse_pnl("n/a"), 0.0);
        assert_eq!(parse_pnl(""), 0.0);
        assert_eq!(parse_pnl("NaN"), 0.0);
    }

    #[test]
    fn dates_normalize() {
        assert_eq!(normalize_date("2024-03-01").as_deref(), Some("2024-03-01"));
        assert_eq!(normalize_date("3/1/2024").as_deref(), Some("2024-03-01"));
        assert_eq!(normalize_date("2024/03/01").as_deref(), Some("2024-03-01"));
        assert_eq!(normalize_date("2024-03-01T14:30:00").as_deref(), Some("2024-03-01"));
        assert_eq!(normalize_date("yesterday"), None);
    }

    #[test]
    fn flexible_headers_and_defaults() {
        let csv = "\
Date,Side,Outcome,P&L ($),Strategy,Notes
2024-01-02,sell,SL,$40.00,breakout,\"late entry, chased\"
1/1/2024,BUY,TP,100,Breakout,
2024-01-03,,,\"(5.25)\",,
";
        let trades = load_from_reader(csv.as_bytes(), AccountMode::Playback).unwrap();
        assert_eq!(trades.len(), 3);

        //sorted chronologically
        assert_eq!(trades[0].trade_date, "2024-01-01");
        assert_eq!(trades[0].id, 2);
        assert_eq!(trades[0].pnl(), 100.0);
        assert_eq!(trades[0].notes, None);

        assert_eq!(trades[1].side, Side::Sell);
        assert_eq!(trades[1].outcome, Outcome::Sl);
        assert_eq!(trades[1].pnl(), -40.0);
        assert_eq!(trades[1].notes.as_deref(), Some("late entry, chased"));

        assert_eq!(trades[2].side, Side::Buy);
        assert_eq!(trades[2].outcome, Outcome::Be);
        assert_eq!(trades[2].pnl(), -5.25);
        assert_eq!(trades[2].strategy_code, "Unknown");
        assert_eq!(trades[2].market_type, "New York (NY)");
        assert_eq!(trades[2].instrument_symbol, "MNQ");
        assert!(trades.iter().all(|t| t.account_mode == AccountMode::Playback));
    }

    #[test]
    fn explicit_ids_and_modes_are_read() {
        let csv = "\
id,trade_date,side,outcome,pnl_usd,strategy_code,market_type,account_mode
7,2024-05-01,BUY,TP,20,A,LDN,playback
3,2024-05-01,SELL,TP,10,A,LDN,
";
        let trades = load_from_reader(csv.as_bytes(), AccountMode::Real).unwrap();
        assert_eq!(trades.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 7]);
        assert_eq!(trades[0].account_mode, AccountMode::Real);
        assert_eq!(trades[1].account_mode, AccountMode::Playback);
        assert_eq!(trades[1].market_type, "LDN");
    }

    #[test]
    fn bad_rows_are_skipped() {
        let csv = "\
date,side,outcome,pnl
2024-01-01,BUY,TP,10
2024-01-02,HOLD,TP,10
x,y
2024-01-03,SELL,WIN,10
";
        let trades = load_from_reader(csv.as_bytes(), AccountMode::Real).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].trade_date, "2024-01-01");
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_csv("/definitely/not/here.csv", AccountMode::Real);
        assert!(result.is_err());
    }
}
