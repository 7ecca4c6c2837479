use crate::config::ReportConfig;
use crate::data::filter::filter_trades;
use crate::data::TradeRecord;
use crate::metrics::breakdown::pretty_print_rows;
use crate::metrics::{
    breakdown_by, build_cumulative_series, cumulative_by_day, max_drawdown, round2, side_bars,
    summarize_with, underperforming, BreakdownKey, BreakdownRow, CumulativeSeries, RankingConfig,
    Summary,
};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

//everything computed for one query over a journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalReport {
    pub summary: Summary,
    //per-trade drawdown, not re-derived from the bucketed series
    pub max_drawdown: f64,
    pub starting_capital: f64,
    pub balance: f64,
    pub equity_curve: CumulativeSeries,
    pub series: CumulativeSeries,
    pub side_bars: Vec<BreakdownRow>,
    pub strategy_performance: Vec<BreakdownRow>,
    pub market_performance: Vec<BreakdownRow>,
    pub leaderboard: Vec<BreakdownRow>,
    pub alerts: Vec<BreakdownRow>,
    pub trades: Vec<TradeRecord>,
}

impl JournalReport {
    //best strategy by net pnl, if any
    pub fn top_strategy(&self) -> Option<&BreakdownRow> {
        self.strategy_performance.first()
    }

    //prints the report as formatted tables
    pub fn pretty_print(&self) {
        self.summary.pretty_print_table();

        let mut table = Table::new();
        table.add_row(Row::new(vec![Cell::new("Account"), Cell::new("Value")]));
        table.add_row(Row::new(vec![
            Cell::new("Starting Capital"),
            Cell::new(&format!("${:.2}", self.starting_capital)),
        ]));
        table.add_row(Row::new(vec![
            Cell::new("Balance"),
            Cell::new(&format!("${:.2}", self.balance)),
        ]));
        table.add_row(Row::new(vec![
            Cell::new("Max Drawdown"),
            Cell::new(&format!("${:.2}", self.max_drawdown)),
        ]));
        if let Some(top) = self.top_strategy() {
            table.add_row(Row::new(vec![
                Cell::new("Top Strategy"),
                Cell::new(&format!("{} ({}%)", top.key, top.win_rate)),
            ]));
        }
        table.printstd();

        println!("\nBy Side");
        pretty_print_rows("Side", &self.side_bars);

        println!("\nStrategy Performance");
        pretty_print_rows("Strategy", &self.strategy_performance);

        println!("\nMarkets");
        pretty_print_rows("Market", &self.market_performance);

        println!("\nLeaderboard (TP vs SL)");
        pretty_print_rows("Strategy", &self.leaderboard);

        if !self.alerts.is_empty() {
            println!("\nUnderperforming Strategies");
            for alert in &self.alerts {
                println!(
                    "  {}: {}% win rate over {} trades",
                    alert.key, alert.win_rate, alert.count
                );
            }
        }

        println!("\nCumulative P&L");
        let mut series = Table::new();
        series.add_row(Row::new(vec![
            Cell::new("Bucket"),
            Cell::new("Cumulative"),
            Cell::new("Drawdown"),
        ]));
        for point in &self.series.points {
            series.add_row(Row::new(vec![
                Cell::new(&point.label),
                Cell::new(&format!("${:.2}", point.cumulative)),
                Cell::new(&format!("${:.2}", point.drawdown)),
            ]));
        }
        series.printstd();
    }
}

//runs every analytics stage over a journal for one configuration
#[derive(Debug, Clone, Default)]
pub struct JournalEngine {
    config: ReportConfig,
}

impl JournalEngine {
    pub fn new(config: ReportConfig) -> Self {
        JournalEngine { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn run(&self, trades: &[TradeRecord]) -> JournalReport {
        let filtered = filter_trades(trades, &self.config.query);
        debug!(
            total = trades.len(),
            selected = filtered.len(),
            "filtered journal"
        );

        let summary = summarize_with(&filtered, self.config.summary_rule);
        let strategy_performance = breakdown_by(
            &filtered,
            BreakdownKey::StrategyCode,
            &RankingConfig::performance(),
        );
        let alerts = underperforming(
            &strategy_performance,
            self.config.alert_min_trades,
            self.config.alert_max_win_rate,
        );
        debug!(
            strategies = strategy_performance.len(),
            alerts = alerts.len(),
            "computed breakdowns"
        );

        JournalReport {
            max_drawdown: max_drawdown(&filtered),
            starting_capital: self.config.starting_capital,
            balance: round2(self.config.starting_capital + summary.net),
            equity_curve: cumulative_by_day(&filtered),
            series: build_cumulative_series(&filtered, self.config.granularity),
            side_bars: side_bars(&filtered),
            market_performance: breakdown_by(
                &filtered,
                BreakdownKey::MarketType,
                &RankingConfig::performance(),
            ),
            leaderboard: breakdown_by(
                &filtered,
                BreakdownKey::StrategyCode,
                &RankingConfig::leaderboard(),
            ),
            summary,
            strategy_performance,
            alerts,
            trades: filtered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Granularity, QueryParams};
    use crate::data::{AccountMode, Outcome, Side};
    use crate::metrics::ProfitFactor;

    fn trade(
        id: i64,
        date: &str,
        strategy: &str,
        pnl: f64,
        outcome: Outcome,
        mode: AccountMode,
    ) -> TradeRecord {
        TradeRecord::new(id, date, Side::Buy, outcome, "NY", strategy, pnl, mode)
    }

    fn journal() -> Vec<TradeRecord> {
        vec![
            trade(1, "2024-01-01", "a", 100.0, Outcome::Tp, AccountMode::Real),
            trade(2, "2024-01-02", "b", -40.0, Outcome::Sl, AccountMode::Real),
            trade(3, "2024-01-03", "a", 60.0, Outcome::Tp, AccountMode::Real),
            trade(4, "2024-01-03", "a", 5000.0, Outcome::Tp, AccountMode::Playback),
        ]
    }

    #[test]
    fn report_stays_inside_one_book() {
        let config = ReportConfig {
            query: QueryParams::new().with_account_mode(AccountMode::Real),
            starting_capital: 1000.0,
            ..ReportConfig::default()
        };
        let report = JournalEngine::new(config).run(&journal());

        assert_eq!(report.summary.count, 3);
        assert_eq!(report.summary.net, 120.0);
        assert_eq!(report.balance, 1120.0);
        assert_eq!(report.max_drawdown, 40.0);
        assert_eq!(report.equity_curve.cumulative_values(), vec![100.0, 60.0, 120.0]);
        assert_eq!(report.top_strategy().map(|r| r.key.as_str()), Some("A"));
        assert_eq!(report.side_bars[0].count, 3);
        assert!(report.trades.iter().all(|t| t.account_mode == AccountMode::Real));
    }

    #[test]
    fn empty_journal_degenerates_gracefully() {
        let report = JournalEngine::default().run(&[]);
        assert_eq!(report.summary, Summary::default());
        assert_eq!(report.summary.profit_factor, ProfitFactor::Finite(0.0));
        assert!(report.series.points.is_empty());
        assert!(report.strategy_performance.is_empty());
        assert!(report.leaderboard.is_empty());
        assert!(report.alerts.is_empty());
        assert_eq!(report.side_bars.len(), 2);
    }

    #[test]
    fn granularity_only_changes_the_series() {
        let config = ReportConfig {
            query: QueryParams::new().with_account_mode(AccountMode::Real),
            granularity: Granularity::Monthly,
            ..ReportConfig::default()
        };
        let report = JournalEngine::new(config).run(&journal());
        assert_eq!(report.series.labels(), vec!["2024-01"]);
        assert_eq!(report.series.final_value(), 120.0);
        assert_eq!(report.equity_curve.points.len(), 3);
    }

    #[test]
    fn running_twice_is_identical() {
        let engine = JournalEngine::default();
        let trades = journal();
        assert_eq!(engine.run(&trades), engine.run(&trades));
    }

    #[test]
    fn report_serializes_profit_factor_as_string() {
        let report = JournalEngine::default().run(&journal());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["profit_factor"], "4.00");
    }

    #[test]
    fn default_report_leaves_out_playback() {
        let trades = vec![
            trade(1, "2024-01-01", "a", 100.0, Outcome::Tp, AccountMode::Real),
            trade(2, "2024-01-02", "a", -40.0, Outcome::Sl, AccountMode::Playback),
        ];
        let report = JournalEngine::default().run(&trades);
        assert_eq!(report.summary.count, 1);
        assert_eq!(report.summary.net, 100.0);
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].account_mode, AccountMode::Real);

        let config = ReportConfig {
            query: QueryParams::new().with_account_mode(AccountMode::Playback),
            ..ReportConfig::default()
        };
        let playback = JournalEngine::new(config).run(&trades);
        assert_eq!(playback.summary.count, 1);
        assert_eq!(playback.summary.net, -40.0);
    }
}
