pub mod breakdown;
pub mod calendar;
pub mod summary;
pub mod timeseries;

pub use breakdown::{
    breakdown_by, side_bars, underperforming, BreakdownKey, BreakdownRow, RankBy, RankingConfig,
    RateBase,
};
pub use calendar::{calendar_month, CalendarDay, CalendarMonth};
pub use summary::{max_drawdown, summarize, summarize_with, ProfitFactor, Summary, WinRule};
pub use timeseries::{
    bucket_label, build_cumulative_series, cumulative_by_day, CumulativeSeries, SeriesPoint,
};

//rounds to a fixed number of decimals, folding -0.0 into 0.0
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

pub(crate) fn round1(value: f64) -> f64 {
    round_to(value, 1)
}
