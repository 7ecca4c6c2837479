use crate::data::trade::{sort_chronologically, Outcome, TradeRecord};
use crate::metrics::{round1, round2};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use statrs::statistics::Statistics;
use std::fmt;

//decides what counts as a win or a loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinRule {
    //win iff pnl > 0, loss iff pnl < 0
    #[default]
    PnlSign,
    //win iff TP, loss iff SL, BE is neither
    Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Win,
    Loss,
    Neutral,
}

impl WinRule {
    pub fn classify(&self, trade: &TradeRecord) -> Verdict {
        match self {
            WinRule::PnlSign => {
                let pnl = trade.pnl();
                if pnl > 0.0 {
                    Verdict::Win
                } else if pnl < 0.0 {
                    Verdict::Loss
                } else {
                    Verdict::Neutral
                }
            }
            WinRule::Outcome => match trade.outcome {
                Outcome::Tp => Verdict::Win,
                Outcome::Sl => Verdict::Loss,
                Outcome::Be => Verdict::Neutral,
            },
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pnl" | "pnl_sign" => Some(WinRule::PnlSign),
            "outcome" | "tp" => Some(WinRule::Outcome),
            _ => None,
        }
    }
}

//gross wins over gross losses, with an explicit sentinel instead of f64::INFINITY
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfitFactor {
    Finite(f64),
    Infinite,
}

impl ProfitFactor {
    pub fn from_gross(gross_wins: f64, gross_losses: f64) -> Self {
        if gross_losses > 0.0 {
            ProfitFactor::Finite(gross_wins / gross_losses)
        } else if gross_wins > 0.0 {
            ProfitFactor::Infinite
        } else {
            ProfitFactor::Finite(0.0)
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, ProfitFactor::Infinite)
    }
}

impl fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitFactor::Finite(value) => write!(f, "{:.2}", round2(*value)),
            ProfitFactor::Infinite => f.write_str("∞"),
        }
    }
}

impl Serialize for ProfitFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProfitFactor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "∞" {
            return Ok(ProfitFactor::Infinite);
        }
        raw.parse::<f64>()
            .map(ProfitFactor::Finite)
            .map_err(serde::de::Error::custom)
    }
}

//scalar summary of a set of trades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub net: f64,
    pub gross_wins: f64,
    pub gross_losses: f64,
    pub profit_factor: ProfitFactor,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl Default for Summary {
    fn default() -> Self {
        Summary {
            count: 0,
            wins: 0,
            losses: 0,
            win_rate: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            net: 0.0,
            gross_wins: 0.0,
            gross_losses: 0.0,
            profit_factor: ProfitFactor::Finite(0.0),
            largest_win: 0.0,
            largest_loss: 0.0,
        }
    }
}

impl Summary {
    //prints the summary in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Number of Trades"),
            Cell::new(&format!("{}", self.count)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Net P&L"),
            Cell::new(&format!("${:.2}", self.net)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Win Rate"),
            Cell::new(&format!(
                "{:.1}% ({}W / {}L)",
                self.win_rate, self.wins, self.losses
            )),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Win"),
            Cell::new(&format!("${:.2}", self.avg_win)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Loss"),
            Cell::new(&format!("${:.2}", self.avg_loss)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Largest Win"),
            Cell::new(&format!("${:.2}", self.largest_win)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Largest Loss"),
            Cell::new(&format!("${:.2}", self.largest_loss)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Profit Factor"),
            Cell::new(&self.profit_factor.to_string()),
        ]));

        table.printstd();
    }
}

//summary using the default pnl-sign win rule
pub fn summarize(trades: &[TradeRecord]) -> Summary {
    summarize_with(trades, WinRule::PnlSign)
}

pub fn summarize_with(trades: &[TradeRecord], rule: WinRule) -> Summary {
    if trades.is_empty() {
        return Summary::default();
    }

    let mut winning: Vec<f64> = Vec::new();
    let mut losing: Vec<f64> = Vec::new();
    let mut net = 0.0;

    for trade in trades {
        let pnl = trade.pnl();
        net += pnl;
        match rule.classify(trade) {
            Verdict::Win => winning.push(pnl),
            Verdict::Loss => losing.push(pnl),
            Verdict::Neutral => {}
        }
    }

    let count = trades.len();
    let win_rate = 100.0 * winning.len() as f64 / count as f64;

    let avg_win = if winning.is_empty() {
        0.0
    } else {
        winning.as_slice().mean()
    };

    let avg_loss = if losing.is_empty() {
        0.0
    } else {
        losing.as_slice().mean()
    };

    let gross_wins: f64 = winning.iter().sum();
    let gross_losses: f64 = losing.iter().sum::<f64>().abs();

    let largest_win = winning.iter().fold(0.0f64, |a, &b| a.max(b));
    let largest_loss = losing.iter().fold(0.0f64, |a, &b| a.min(b));

    Summary {
        count,
        wins: winning.len(),
        losses: losing.len(),
        win_rate: round1(win_rate),
        avg_win: round2(avg_win),
        avg_loss: round2(avg_loss),
        net: round2(net),
        gross_wins: round2(gross_wins),
        gross_losses: round2(gross_losses),
        profit_factor: ProfitFactor::from_gross(gross_wins, gross_losses),
        largest_win: round2(largest_win),
        largest_loss: round2(largest_loss),
    }
}

//largest peak-to-trough decline of the per-trade running pnl, as a positive number
pub fn max_drawdown(trades: &[TradeRecord]) -> f64 {
    let mut running = 0.0;
    let mut peak = 0.0f64;
    let mut worst = 0.0f64;

    for trade in sort_chronologically(trades) {
        running += trade.pnl();
        peak = peak.max(running);
        worst = worst.min(running - peak);
    }

    round2(worst.abs())
}
