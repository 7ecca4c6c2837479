use crate::config::Granularity;
use crate::data::trade::{sort_chronologically, TradeRecord};
use crate::metrics::round2;
use chrono::{Datelike, Duration, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

//a point in the cumulative pnl curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub cumulative: f64,
    pub peak: f64,
    pub drawdown: f64,
}

impl SeriesPoint {
    pub fn new(label: String, cumulative: f64, peak: f64, drawdown: f64) -> Self {
        SeriesPoint {
            label,
            cumulative,
            peak,
            drawdown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeSeries {
    pub points: Vec<SeriesPoint>,
    pub max_drawdown: f64,
}

impl CumulativeSeries {
    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    pub fn cumulative_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.cumulative).collect()
    }

    pub fn final_value(&self) -> f64 {
        self.points.last().map(|p| p.cumulative).unwrap_or(0.0)
    }
}

//parses a timezone-naive YYYY-MM-DD date, tolerating unpadded parts
pub fn parse_trade_date(date: &str) -> Option<NaiveDate> {
    let mut parts = date.trim().splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

//monday on or before the given date
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

//bucket key for a trade date; unparsable dates become their own bucket
pub fn bucket_label(granularity: Granularity, trade_date: &str) -> String {
    if granularity == Granularity::Daily {
        return trade_date.to_string();
    }

    let Some(date) = parse_trade_date(trade_date) else {
        warn!(trade_date, "unparsable trade date, bucketing it verbatim");
        return trade_date.to_string();
    };

    match granularity {
        Granularity::Daily => trade_date.to_string(),
        Granularity::Weekly => format!("Wk of {}", week_start(date).format("%Y-%m-%d")),
        Granularity::Monthly => format!("{}-{:02}", date.year(), date.month()),
        Granularity::Yearly => date.year().to_string(),
    }
}

//groups trades into buckets and walks them with a running total, peak and drawdown
pub fn build_cumulative_series(
    trades: &[TradeRecord],
    granularity: Granularity,
) -> CumulativeSeries {
    //insertion order is chronological first occurrence, labels are never re-sorted
    let mut bucket_net: IndexMap<String, f64> = IndexMap::new();
    for trade in sort_chronologically(trades) {
        let label = bucket_label(granularity, &trade.trade_date);
        *bucket_net.entry(label).or_insert(0.0) += trade.pnl();
    }

    let mut points = Vec::with_capacity(bucket_net.len());
    let mut running = 0.0;
    let mut peak = 0.0f64;
    let mut worst = 0.0f64;

    for (label, net) in bucket_net {
        running += net;
        peak = peak.max(running);
        let drawdown = running - peak;
        worst = worst.min(drawdown);

        points.push(SeriesPoint::new(
            label,
            round2(running),
            round2(peak),
            round2(drawdown),
        ));
    }

    CumulativeSeries {
        points,
        max_drawdown: round2(worst.abs()),
    }
}

//per-day equity curve keyed by the trade date itself
pub fn cumulative_by_day(trades: &[TradeRecord]) -> CumulativeSeries {
    build_cumulative_series(trades, Granularity::Daily)
}
