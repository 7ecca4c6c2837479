//a Rust-based trade journal analytics engine

pub mod config;
pub mod data;
pub mod engine;
pub mod metrics;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Granularity, QueryParams, ReportConfig};
    pub use crate::data::{
        export_file_name, filter_trades, load_csv, load_from_reader, save_csv, to_csv_string,
        write_csv, AccountMode, Outcome, Side, TradeError, TradeRecord,
    };
    pub use crate::engine::{JournalEngine, JournalReport};
    pub use crate::metrics::{
        breakdown_by, bucket_label, build_cumulative_series, calendar_month, cumulative_by_day,
        max_drawdown, side_bars, summarize, summarize_with, underperforming, BreakdownKey,
        BreakdownRow, CalendarDay, CalendarMonth, CumulativeSeries, ProfitFactor, RankBy,
        RankingConfig, RateBase, SeriesPoint, Summary, WinRule,
    };
}
