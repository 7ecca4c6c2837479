use crate::data::trade::TradeRecord;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const EXPORT_HEADERS: [&str; 11] = [
    "Trade ID",
    "Date",
    "Side",
    "Outcome",
    "Instrument Type",
    "Symbol",
    "Market",
    "Schedule",
    "Strategy",
    "P&L ($)",
    "Notes",
];

//default export file name for a given day
pub fn export_file_name(day: NaiveDate) -> String {
    format!("trading_journal_{}.csv", day.format("%Y-%m-%d"))
}

//notes are always quoted with inner quotes doubled, other fields are written raw
fn quote_notes(notes: Option<&str>) -> String {
    match notes {
        Some(text) => format!("\"{}\"", text.replace('"', "\"\"")),
        None => "\"\"".to_string(),
    }
}

//pnl as a plain number: no "-0", exponent form outside [1e-6, 1e21)
fn format_pnl(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        value.to_string()
    } else {
        let formatted = format!("{:e}", value);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    }
}

fn export_row(trade: &TradeRecord) -> String {
    [
        trade.id.to_string(),
        trade.trade_date.clone(),
        trade.side.to_string(),
        trade.outcome.to_string(),
        trade.instrument_type.clone(),
        trade.instrument_symbol.clone(),
        trade.market_type.clone(),
        trade.schedule.clone(),
        trade.strategy_code.clone(),
        format_pnl(trade.pnl()),
        quote_notes(trade.notes.as_deref()),
    ]
    .join(",")
}

pub fn to_csv_string(trades: &[TradeRecord]) -> String {
    let mut out = EXPORT_HEADERS.join(",");
    for trade in trades {
        out.push('\n');
        out.push_str(&export_row(trade));
    }
    out
}

//writes the header and one row per trade, newline separated, no trailing newline
pub fn write_csv<W: Write>(trades: &[TradeRecord], writer: &mut W) -> Result<()> {
    writer.write_all(to_csv_string(trades).as_bytes())?;
    writer.flush()?;
    Ok(())
}

//saves trades to a csv file
pub fn save_csv<P: AsRef<Path>>(trades: &[TradeRecord], path: P) -> Result<()> {
    let path = path.as_ref();
    let file =
        std::fs::File::create(path).context(format!("Failed to create CSV file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    write_csv(trades, &mut writer)
}
