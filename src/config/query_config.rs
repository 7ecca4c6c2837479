use crate::data::trade::AccountMode;
use crate::metrics::summary::WinRule;
use serde::{Deserialize, Serialize};
use std::path::Path;

//sentinel meaning "no year/month selected"
pub const ALL: &str = "ALL";

//time bucket for cumulative series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Granularity {
    //parse granularity from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Some(Granularity::Daily),
            "weekly" | "week" | "w" => Some(Granularity::Weekly),
            "monthly" | "month" | "m" => Some(Granularity::Monthly),
            "yearly" | "year" | "y" => Some(Granularity::Yearly),
            _ => None,
        }
    }
}

//every recognized filter option, all optional and combined with AND
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    //always applied, the two books are never mixed; missing or empty means REAL
    pub account_mode: AccountMode,

    //4-digit year or "ALL"
    pub year: Option<String>,

    //2-digit month or "ALL", ignored unless a year is selected
    pub month: Option<String>,

    //inclusive YYYY-MM-DD bounds
    pub start_date: Option<String>,
    pub end_date: Option<String>,

    pub strategy_code: Option<String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account_mode(mut self, mode: AccountMode) -> Self {
        self.account_mode = mode;
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_month(mut self, month: impl Into<String>) -> Self {
        self.month = Some(month.into());
        self
    }

    pub fn with_date_range(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_strategy(mut self, code: impl Into<String>) -> Self {
        self.strategy_code = Some(code.into());
        self
    }

    //the year filter in effect, if any
    pub fn active_year(&self) -> Option<&str> {
        selection(self.year.as_deref())
    }

    //the month filter in effect; a month without a year selects nothing
    pub fn active_month(&self) -> Option<&str> {
        self.active_year()?;
        selection(self.month.as_deref())
    }

    //the strategy filter in effect, normalized
    pub fn active_strategy(&self) -> Option<String> {
        self.strategy_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_uppercase)
    }

    //load query parameters from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let query: QueryParams = serde_json::from_str(&contents)?;
        Ok(query)
    }

    //save query parameters to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn selection(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL))
}

//everything the report engine needs besides the trades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub query: QueryParams,
    pub granularity: Granularity,
    pub starting_capital: f64,

    //win definition for the headline summary
    pub summary_rule: WinRule,

    //alert thresholds for underperforming strategies
    pub alert_min_trades: usize,
    pub alert_max_win_rate: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            query: QueryParams::default(),
            granularity: Granularity::Daily,
            starting_capital: 0.0,
            summary_rule: WinRule::PnlSign,
            alert_min_trades: 3,
            alert_max_win_rate: 40.0,
        }
    }
}

impl ReportConfig {
    //load report configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ReportConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save report configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
