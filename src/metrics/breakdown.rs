use crate::data::trade::{normalize_strategy_code, Side, TradeRecord};
use crate::metrics::{round1, round2};
use crate::metrics::summary::{Verdict, WinRule};
use indexmap::IndexMap;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};

//categorical field to partition trades by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownKey {
    Side,
    MarketType,
    StrategyCode,
}

impl BreakdownKey {
    //partition key for a trade; blanks become "Unknown", strategy codes are upper-cased
    pub fn key_for(&self, trade: &TradeRecord) -> String {
        match self {
            BreakdownKey::Side => trade.side.as_str().to_string(),
            BreakdownKey::MarketType => {
                let market = trade.market_type.trim();
                if market.is_empty() {
                    "Unknown".to_string()
                } else {
                    market.to_string()
                }
            }
            BreakdownKey::StrategyCode => normalize_strategy_code(&trade.strategy_code),
        }
    }
}

//which trades form the win rate denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBase {
    AllTrades,
    //wins + losses, neutral trades excluded
    DecidedTrades,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    Net,
    WinRate,
}

//win predicate, denominator and ordering for a breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingConfig {
    pub rule: WinRule,
    pub rate_base: RateBase,
    pub rank_by: RankBy,
}

impl RankingConfig {
    //pnl > 0 wins over every trade, best net first
    pub fn performance() -> Self {
        RankingConfig {
            rule: WinRule::PnlSign,
            rate_base: RateBase::AllTrades,
            rank_by: RankBy::Net,
        }
    }

    //TP vs SL with BE left out, best win rate first
    pub fn leaderboard() -> Self {
        RankingConfig {
            rule: WinRule::Outcome,
            rate_base: RateBase::DecidedTrades,
            rank_by: RankBy::WinRate,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self::performance()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub key: String,
    pub count: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,
    pub net: f64,
    //one decimal, e.g. "66.7"
    pub win_rate: String,
}

impl BreakdownRow {
    pub fn win_rate_value(&self) -> f64 {
        self.win_rate.parse().unwrap_or(0.0)
    }
}

#[derive(Debug, Default)]
struct Tally {
    count: usize,
    wins: usize,
    losses: usize,
    breakeven: usize,
    net: f64,
}

impl Tally {
    fn add(&mut self, trade: &TradeRecord, rule: WinRule) {
        self.count += 1;
        self.net += trade.pnl();
        match rule.classify(trade) {
            Verdict::Win => self.wins += 1,
            Verdict::Loss => self.losses += 1,
            Verdict::Neutral => self.breakeven += 1,
        }
    }

    fn win_rate(&self, base: RateBase) -> f64 {
        let denominator = match base {
            RateBase::AllTrades => self.count,
            RateBase::DecidedTrades => self.wins + self.losses,
        };
        if denominator == 0 {
            0.0
        } else {
            100.0 * self.wins as f64 / denominator as f64
        }
    }
}

pub fn breakdown_by(
    trades: &[TradeRecord],
    key: BreakdownKey,
    ranking: &RankingConfig,
) -> Vec<BreakdownRow> {
    let mut partitions: IndexMap<String, Tally> = IndexMap::new();
    for trade in trades {
        partitions
            .entry(key.key_for(trade))
            .or_default()
            .add(trade, ranking.rule);
    }

    let mut ranked: Vec<(String, Tally, f64)> = partitions
        .into_iter()
        .map(|(k, tally)| {
            let rate = tally.win_rate(ranking.rate_base);
            (k, tally, rate)
        })
        .collect();

    //stable sort, exact ties keep first-insertion order
    match ranking.rank_by {
        RankBy::Net => ranked.sort_by(|a, b| b.1.net.total_cmp(&a.1.net)),
        RankBy::WinRate => ranked.sort_by(|a, b| b.2.total_cmp(&a.2)),
    }

    ranked
        .into_iter()
        .map(|(key, tally, rate)| BreakdownRow {
            key,
            count: tally.count,
            wins: tally.wins,
            losses: tally.losses,
            breakeven: tally.breakeven,
            net: round2(tally.net),
            win_rate: format!("{:.1}", round1(rate)),
        })
        .collect()
}

//buy and sell rows, both always present, in that order
pub fn side_bars(trades: &[TradeRecord]) -> Vec<BreakdownRow> {
    let ranking = RankingConfig::performance();
    [Side::Buy, Side::Sell]
        .into_iter()
        .map(|side| {
            let mut tally = Tally::default();
            for trade in trades.iter().filter(|t| t.side == side) {
                tally.add(trade, ranking.rule);
            }
            BreakdownRow {
                key: side.as_str().to_string(),
                count: tally.count,
                wins: tally.wins,
                losses: tally.losses,
                breakeven: tally.breakeven,
                net: round2(tally.net),
                win_rate: format!("{:.1}", round1(tally.win_rate(ranking.rate_base))),
            }
        })
        .collect()
}

//rows with enough trades to judge and a win rate below the threshold
pub fn underperforming(
    rows: &[BreakdownRow],
    min_trades: usize,
    max_win_rate: f64,
) -> Vec<BreakdownRow> {
    rows.iter()
        .filter(|row| row.count >= min_trades && row.win_rate_value() < max_win_rate)
        .cloned()
        .collect()
}

//prints breakdown rows in a formatted table
pub fn pretty_print_rows(title: &str, rows: &[BreakdownRow]) {
    let mut table = Table::new();

    table.add_row(Row::new(vec![
        Cell::new(title),
        Cell::new("Trades"),
        Cell::new("W / L / BE"),
        Cell::new("Win Rate"),
        Cell::new("Net P&L"),
    ]));

    for row in rows {
        table.add_row(Row::new(vec![
            Cell::new(&row.key),
            Cell::new(&row.count.to_string()),
            Cell::new(&format!("{} / {} / {}", row.wins, row.losses, row.breakeven)),
            Cell::new(&format!("{}%", row.win_rate)),
            Cell::new(&format!("${:.2}", row.net)),
        ]));
    }

    table.printstd();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::trade::{AccountMode, Outcome};

    fn trade(id: i64, strategy: &str, pnl: f64, outcome: Outcome) -> TradeRecord {
        TradeRecord::new(
            id,
            "2024-01-01",
            if id % 2 == 0 { Side::Sell } else { Side::Buy },
            outcome,
            "NY",
            strategy,
            pnl,
            AccountMode::Real,
        )
    }

    #[test]
    fn strategy_scenario_sorted_by_net() {
        let trades = vec![
            trade(1, "A", 10.0, Outcome::Tp),
            trade(2, "B", -5.0, Outcome::Sl),
            trade(3, "A", -20.0, Outcome::Sl),
        ];
        let rows = breakdown_by(&trades, BreakdownKey::StrategyCode, &RankingConfig::performance());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "B");
        assert_eq!(rows[0].count, 1);
        assert_eq!(rows[0].net, -5.0);
        assert_eq!(rows[1].key, "A");
        assert_eq!(rows[1].count, 2);
        assert_eq!(rows[1].net, -10.0);
        assert_eq!(rows[1].win_rate, "50.0");
    }

    #[test]
    fn blank_keys_become_unknown() {
        let mut market_blank = trade(1, "", 1.0, Outcome::Tp);
        market_blank.market_type = "  ".to_string();
        let trades = vec![market_blank, trade(2, "scalp", 1.0, Outcome::Tp)];

        let by_strategy =
            breakdown_by(&trades, BreakdownKey::StrategyCode, &RankingConfig::performance());
        let keys: Vec<&str> = by_strategy.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["UNKNOWN", "SCALP"]);

        let by_market = breakdown_by(&trades, BreakdownKey::MarketType, &RankingConfig::performance());
        let keys: Vec<&str> = by_market.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Unknown", "NY"]);
    }

    #[test]
    fn row_rate_rounds_like_the_summary() {
        let mut trades = vec![trade(1, "A", 10.0, Outcome::Tp)];
        trades.extend((2..=16).map(|id| trade(id, "A", -1.0, Outcome::Sl)));

        let rows = breakdown_by(&trades, BreakdownKey::StrategyCode, &RankingConfig::performance());
        assert_eq!(rows[0].win_rate, "6.3");
        assert_eq!(
            rows[0].win_rate,
            format!("{:.1}", crate::metrics::summarize(&trades).win_rate)
        );
    }

    #[test]
    fn ties_keep_insertion_order() {
        let trades = vec![
            trade(1, "X", 5.0, Outcome::Tp),
            trade(2, "Y", 5.0, Outcome::Tp),
            trade(3, "Z", 5.0, Outcome::Tp),
        ];
        let rows = breakdown_by(&trades, BreakdownKey::StrategyCode, &RankingConfig::performance());
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn leaderboard_excludes_breakeven_from_denominator() {
        let trades = vec![
            trade(1, "A", 50.0, Outcome::Tp),
            trade(3, "A", 0.0, Outcome::Be),
            trade(5, "A", -20.0, Outcome::Sl),
            trade(7, "B", 10.0, Outcome::Tp),
            trade(9, "B", 2.0, Outcome::Be),
        ];
        let rows = breakdown_by(&trades, BreakdownKey::StrategyCode, &RankingConfig::leaderboard());

        assert_eq!(rows[0].key, "B");
        assert_eq!(rows[0].win_rate, "100.0");
        assert_eq!(rows[0].breakeven, 1);
        assert_eq!(rows[1].key, "A");
        assert_eq!(rows[1].win_rate, "50.0");
        assert_eq!(rows[1].count, 3);
    }

    #[test]
    fn only_breakeven_gives_zero_rate() {
        let trades = vec![trade(1, "A", 0.0, Outcome::Be)];
        let rows = breakdown_by(&trades, BreakdownKey::StrategyCode, &RankingConfig::leaderboard());
        assert_eq!(rows[0].win_rate, "0.0");
    }

    #[test]
    fn empty_input_gives_no_rows() {
        assert!(breakdown_by(&[], BreakdownKey::Side, &RankingConfig::default()).is_empty());
    }

    #[test]
    fn side_bars_always_have_both_sides() {
        let trades = vec![trade(1, "A", 30.0, Outcome::Tp), trade(3, "A", -10.0, Outcome::Sl)];
        let bars = side_bars(&trades);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].key, "BUY");
        assert_eq!(bars[0].count, 2);
        assert_eq!(bars[0].net, 20.0);
        assert_eq!(bars[0].win_rate, "50.0");
        assert_eq!(bars[1].key, "SELL");
        assert_eq!(bars[1].count, 0);
        assert_eq!(bars[1].win_rate, "0.0");
    }

    #[test]
    fn underperformers_need_enough_trades() {
        let trades = vec![
            trade(1, "A", -1.0, Outcome::Sl),
            trade(3, "A", -1.0, Outcome::Sl),
            trade(5, "A", 1.0, Outcome::Tp),
            trade(7, "B", -1.0, Outcome::Sl),
            trade(9, "B", -1.0, Outcome::Sl),
        ];
        let rows = breakdown_by(&trades, BreakdownKey::StrategyCode, &RankingConfig::performance());
        let flagged = underperforming(&rows, 3, 40.0);

        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].key, "A");
        assert_eq!(flagged[0].win_rate, "33.3");
    }
}
