use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("Invalid side: '{0}' (expected BUY or SELL)")]
    InvalidSide(String),
    #[error("Invalid outcome: '{0}' (expected TP, SL or BE)")]
    InvalidOutcome(String),
    #[error("Invalid account mode: '{0}' (expected REAL or PLAYBACK)")]
    InvalidAccountMode(String),
    #[error("Invalid calendar month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

//direction of the trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn parse(s: &str) -> Result<Self, TradeError> {
        match s.trim().to_uppercase().as_str() {
            "BUY" | "LONG" => Ok(Side::Buy),
            "SELL" | "SHORT" => Ok(Side::Sell),
            _ => Err(TradeError::InvalidSide(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl TryFrom<String> for Side {
    type Error = TradeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Side::parse(&value)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//how the trade was closed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Outcome {
    //take profit
    Tp,
    //stop loss
    Sl,
    //breakeven
    Be,
}

impl Outcome {
    pub fn parse(s: &str) -> Result<Self, TradeError> {
        match s.trim().to_uppercase().as_str() {
            "TP" => Ok(Outcome::Tp),
            "SL" => Ok(Outcome::Sl),
            "BE" => Ok(Outcome::Be),
            _ => Err(TradeError::InvalidOutcome(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Tp => "TP",
            Outcome::Sl => "SL",
            Outcome::Be => "BE",
        }
    }
}

impl TryFrom<String> for Outcome {
    type Error = TradeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Outcome::parse(&value)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//which book the trade belongs to, real money or playback practice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum AccountMode {
    #[default]
    Real,
    Playback,
}

impl AccountMode {
    //an empty value means REAL
    pub fn parse(s: &str) -> Result<Self, TradeError> {
        match s.trim().to_uppercase().as_str() {
            "" | "REAL" => Ok(AccountMode::Real),
            "PLAYBACK" => Ok(AccountMode::Playback),
            _ => Err(TradeError::InvalidAccountMode(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountMode::Real => "REAL",
            AccountMode::Playback => "PLAYBACK",
        }
    }
}

impl TryFrom<String> for AccountMode {
    type Error = TradeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AccountMode::parse(&value)
    }
}

impl fmt::Display for AccountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//a single journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: i64,

    //YYYY-MM-DD, no time of day and no timezone
    pub trade_date: String,

    pub side: Side,
    pub outcome: Outcome,
    pub market_type: String,
    pub strategy_code: String,

    //signed dollar pnl, read it through pnl()
    pub pnl_usd: f64,

    #[serde(default)]
    pub account_mode: AccountMode,

    //descriptive fields, only carried through to the csv export
    #[serde(default)]
    pub instrument_type: String,
    #[serde(default)]
    pub instrument_symbol: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub psychology: Option<String>,
    #[serde(default)]
    pub risk_percentage: f64,
}

impl TradeRecord {
    //creates a record with the analytics fields set and the descriptive ones empty
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        trade_date: impl Into<String>,
        side: Side,
        outcome: Outcome,
        market_type: impl Into<String>,
        strategy_code: impl Into<String>,
        pnl_usd: f64,
        account_mode: AccountMode,
    ) -> Self {
        TradeRecord {
            id,
            trade_date: trade_date.into(),
            side,
            outcome,
            market_type: market_type.into(),
            strategy_code: strategy_code.into(),
            pnl_usd: sanitize_pnl(pnl_usd),
            account_mode,
            instrument_type: String::new(),
            instrument_symbol: String::new(),
            schedule: String::new(),
            notes: None,
            psychology: None,
            risk_percentage: 0.0,
        }
    }

    //pnl with non-finite values coerced to zero
    pub fn pnl(&self) -> f64 {
        sanitize_pnl(self.pnl_usd)
    }

    //year component of the trade date ("" when the date is too short)
    pub fn year(&self) -> &str {
        self.trade_date.get(0..4).unwrap_or("")
    }

    //month component of the trade date ("" when the date is too short)
    pub fn month(&self) -> &str {
        self.trade_date.get(5..7).unwrap_or("")
    }

    //strategy code trimmed and upper-cased, UNKNOWN when blank
    pub fn normalized_strategy(&self) -> String {
        normalize_strategy_code(&self.strategy_code)
    }
}

pub fn sanitize_pnl(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub fn normalize_strategy_code(code: &str) -> String {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        "UNKNOWN".to_string()
    } else {
        trimmed.to_uppercase()
    }
}

//canonical chronological order: trade date, then id
pub fn sort_chronologically(trades: &[TradeRecord]) -> Vec<&TradeRecord> {
    let mut sorted: Vec<&TradeRecord> = trades.iter().collect();
    sorted.sort_by(|a, b| {
        a.trade_date
            .cmp(&b.trade_date)
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted
}
