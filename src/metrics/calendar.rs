use crate::data::trade::{TradeError, TradeRecord};
use crate::metrics::round2;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub day: u32,
    pub date: String,
    pub pnl: f64,
    pub trades: usize,
}

//one month of daily pnl laid out for a sunday-first grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    //empty cells before the 1st, 0 when the month starts on sunday
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    pub fn net(&self) -> f64 {
        round2(self.days.iter().map(|d| d.pnl).sum())
    }

    pub fn trading_days(&self) -> usize {
        self.days.iter().filter(|d| d.trades > 0).count()
    }

    //renders the grid as text, one week per line
    pub fn render(&self) -> String {
        let mut out = String::from("   Sun      Mon      Tue      Wed      Thu      Fri      Sat\n");
        let mut column = 0;

        for _ in 0..self.leading_blanks {
            out.push_str(&format!("{:>9}", ""));
            column += 1;
        }

        for day in &self.days {
            let cell = if day.trades > 0 {
                format!("{}:{:+.0}", day.day, day.pnl)
            } else {
                format!("{}", day.day)
            };
            out.push_str(&format!("{:>9}", cell));
            column += 1;
            if column % 7 == 0 {
                out.push('\n');
            }
        }

        if column % 7 != 0 {
            out.push('\n');
        }
        out
    }
}

pub fn calendar_month(
    trades: &[TradeRecord],
    year: i32,
    month: u32,
) -> Result<CalendarMonth, TradeError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(TradeError::InvalidMonth { year, month })?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or(TradeError::InvalidMonth { year, month })?;
    let days_in_month = (next_first - first).num_days() as u32;

    let mut daily: HashMap<&str, (f64, usize)> = HashMap::new();
    for trade in trades {
        let entry = daily.entry(trade.trade_date.as_str()).or_insert((0.0, 0));
        entry.0 += trade.pnl();
        entry.1 += 1;
    }

    let days = (1..=days_in_month)
        .map(|day| {
            let date = format!("{:04}-{:02}-{:02}", year, month, day);
            let (pnl, count) = daily.get(date.as_str()).copied().unwrap_or((0.0, 0));
            CalendarDay {
                day,
                date,
                pnl: round2(pnl),
                trades: count,
            }
        })
        .collect();

    Ok(CalendarMonth {
        year,
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        days,
    })
}
