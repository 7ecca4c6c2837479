use crate::config::QueryParams;
use crate::data::trade::TradeRecord;

//returns the trades matching every active criterion, keeping input order and duplicates
pub fn filter_trades(trades: &[TradeRecord], query: &QueryParams) -> Vec<TradeRecord> {
    let year = query.active_year();
    let month = query.active_month();
    let strategy = query.active_strategy();

    trades
        .iter()
        .filter(|trade| trade.account_mode == query.account_mode)
        .filter(|trade| year.map_or(true, |y| trade.trade_date.starts_with(y)))
        .filter(|trade| month.map_or(true, |m| trade.month() == m))
        .filter(|trade| {
            query
                .start_date
                .as_deref()
                .filter(|start| !start.is_empty())
                .map_or(true, |start| trade.trade_date.as_str() >= start)
        })
        .filter(|trade| {
            query
                .end_date
                .as_deref()
                .filter(|end| !end.is_empty())
                .map_or(true, |end| trade.trade_date.as_str() <= end)
        })
        .filter(|trade| {
            strategy
                .as_deref()
                .map_or(true, |code| trade.normalized_strategy() == code)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::trade::{AccountMode, Outcome, Side};

    fn trade(id: i64, date: &str, strategy: &str, mode: AccountMode) -> TradeRecord {
        TradeRecord::new(id, date, Side::Buy, Outcome::Tp, "NY", strategy, 10.0, mode)
    }

    fn ids(trades: &[TradeRecord]) -> Vec<i64> {
        trades.iter().map(|t| t.id).collect()
    }

    fn sample() -> Vec<TradeRecord> {
        vec![
            trade(1, "2024-01-15", "breakout", AccountMode::Real),
            trade(2, "2024-03-02", "Breakout", AccountMode::Playback),
            trade(3, "2024-03-20", "reversal", AccountMode::Real),
            trade(4, "2025-03-05", "", AccountMode::Real),
        ]
    }

    #[test]
    fn default_query_is_the_real_book() {
        let trades = sample();
        assert_eq!(ids(&filter_trades(&trades, &QueryParams::new())), vec![1, 3, 4]);
    }

    #[test]
    fn account_books_never_mix() {
        let trades = sample();
        let real = filter_trades(&trades, &QueryParams::new().with_account_mode(AccountMode::Real));
        let playback = filter_trades(
            &trades,
            &QueryParams::new().with_account_mode(AccountMode::Playback),
        );
        assert_eq!(ids(&real), vec![1, 3, 4]);
        assert_eq!(ids(&playback), vec![2]);
    }

    #[test]
    fn month_without_year_has_no_effect() {
        let trades = sample();
        let query = QueryParams::new().with_month("03");
        assert_eq!(ids(&filter_trades(&trades, &query)), vec![1, 3, 4]);

        let query = query.with_year("2024");
        assert_eq!(ids(&filter_trades(&trades, &query)), vec![3]);

        let playback = query.with_account_mode(AccountMode::Playback);
        assert_eq!(ids(&filter_trades(&trades, &playback)), vec![2]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let trades = sample();
        let query = QueryParams::new().with_date_range(
            Some("2024-01-15".to_string()),
            Some("2024-03-20".to_string()),
        );
        assert_eq!(ids(&filter_trades(&trades, &query)), vec![1, 3]);

        let open_ended = QueryParams::new().with_date_range(Some("2024-03-03".to_string()), None);
        assert_eq!(ids(&filter_trades(&trades, &open_ended)), vec![3, 4]);
    }

    #[test]
    fn strategy_match_is_case_normalized() {
        let trades = sample();
        let query = QueryParams::new().with_strategy("BREAKOUT");
        assert_eq!(ids(&filter_trades(&trades, &query)), vec![1]);

        let playback = query.with_account_mode(AccountMode::Playback);
        assert_eq!(ids(&filter_trades(&trades, &playback)), vec![2]);

        let unknown = QueryParams::new().with_strategy("unknown");
        assert_eq!(ids(&filter_trades(&trades, &unknown)), vec![4]);
    }

    #[test]
    fn duplicates_are_preserved() {
        let mut trades = sample();
        trades.push(trades[0].clone());
        let query = QueryParams::new().with_year("2024").with_strategy("breakout");
        assert_eq!(ids(&filter_trades(&trades, &query)), vec![1, 1]);
    }
}
