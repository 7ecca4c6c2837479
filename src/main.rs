use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tradelog::prelude::*;

#[derive(Parser)]
#[command(name = "tradelog")]
#[command(about = "Trade journal analytics: equity curve, drawdown, win rate and strategy breakdowns", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

//filter options shared by every subcommand
#[derive(Args, Debug, Clone)]
struct FilterArgs {
    //path to journal csv file
    #[arg(long)]
    data: PathBuf,

    //json file with saved query parameters, flags below override it
    #[arg(long)]
    query: Option<PathBuf>,

    //account book (real, playback), defaults to real
    #[arg(long)]
    mode: Option<String>,

    //year (eg 2024) or ALL
    #[arg(long)]
    year: Option<String>,

    //2-digit month (eg 03) or ALL, needs --year
    #[arg(long)]
    month: Option<String>,

    //first trade date to include (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    //last trade date to include (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,

    //strategy code
    #[arg(long)]
    strategy: Option<String>,
}

impl FilterArgs {
    fn to_query(&self) -> Result<QueryParams> {
        let mut query = match &self.query {
            Some(path) => QueryParams::from_json_file(path)
                .context(format!("Failed to load query from {:?}", path))?,
            None => QueryParams::default(),
        };

        if let Some(mode) = &self.mode {
            query.account_mode = AccountMode::parse(mode)?;
        }
        if self.year.is_some() {
            query.year = self.year.clone();
        }
        if self.month.is_some() {
            query.month = self.month.clone();
        }
        if self.start.is_some() {
            query.start_date = self.start.clone();
        }
        if self.end.is_some() {
            query.end_date = self.end.clone();
        }
        if self.strategy.is_some() {
            query.strategy_code = self.strategy.clone();
        }

        Ok(query)
    }

}

#[derive(Subcommand)]
enum Commands {
    //print analytics for a journal
    Report {
        #[command(flatten)]
        filters: FilterArgs,

        //bucket size for the cumulative series (daily, weekly, monthly, yearly)
        #[arg(long, default_value = "daily")]
        granularity: String,

        //win definition for the summary (pnl, outcome)
        #[arg(long, default_value = "pnl")]
        win_rule: String,

        //starting capital added to net pnl for the live balance
        #[arg(long, default_value = "0")]
        starting_capital: f64,

        //print the report as json instead of tables
        #[arg(long)]
        json: bool,
    },

    //export the filtered trades as csv
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        //output path (defaults to trading_journal_<today>.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    //print a monthly pnl calendar
    Calendar {
        #[command(flatten)]
        filters: FilterArgs,

        //calendar year
        #[arg(long = "cal-year")]
        cal_year: i32,

        //calendar month (1-12)
        #[arg(long = "cal-month")]
        cal_month: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            filters,
            granularity,
            win_rule,
            starting_capital,
            json,
        } => run_report(filters, granularity, win_rule, starting_capital, json)?,
        Commands::Export { filters, output } => run_export(filters, output)?,
        Commands::Calendar {
            filters,
            cal_year,
            cal_month,
        } => run_calendar(filters, cal_year, cal_month)?,
    }

    Ok(())
}

fn load_filtered(filters: &FilterArgs) -> Result<(Vec<TradeRecord>, QueryParams)> {
    let query = filters.to_query()?;
    //rows without an account_mode column belong to the selected book
    let trades = load_csv(&filters.data, query.account_mode)
        .context(format!("Failed to load journal from {:?}", filters.data))?;
    info!(count = trades.len(), path = ?filters.data, "loaded journal");
    Ok((trades, query))
}

fn run_report(
    filters: FilterArgs,
    granularity: String,
    win_rule: String,
    starting_capital: f64,
    json: bool,
) -> Result<()> {
    let granularity = Granularity::parse(&granularity)
        .ok_or_else(|| anyhow::anyhow!("Unknown granularity: {}", granularity))?;
    let summary_rule = WinRule::parse(&win_rule)
        .ok_or_else(|| anyhow::anyhow!("Unknown win rule: {}", win_rule))?;

    let (trades, query) = load_filtered(&filters)?;

    let config = ReportConfig {
        query,
        granularity,
        starting_capital,
        summary_rule,
        ..ReportConfig::default()
    };
    let report = JournalEngine::new(config).run(&trades);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Trade Journal Report");
    println!("====================\n");
    println!(
        "{} of {} trades selected\n",
        report.trades.len(),
        trades.len()
    );
    report.pretty_print();

    Ok(())
}

fn run_export(filters: FilterArgs, output: Option<PathBuf>) -> Result<()> {
    let (trades, query) = load_filtered(&filters)?;
    let selected = filter_trades(&trades, &query);

    if selected.is_empty() {
        anyhow::bail!("No trades to export for this selection");
    }

    let path = output.unwrap_or_else(|| {
        PathBuf::from(export_file_name(chrono::Local::now().date_naive()))
    });
    save_csv(&selected, &path)?;
    println!("Exported {} trades to {:?}", selected.len(), path);

    Ok(())
}

fn run_calendar(filters: FilterArgs, year: i32, month: u32) -> Result<()> {
    let (trades, query) = load_filtered(&filters)?;
    let selected = filter_trades(&trades, &query);
    let calendar = calendar_month(&selected, year, month)?;

    println!("{}-{:02}", calendar.year, calendar.month);
    print!("{}", calendar.render());
    println!(
        "\nNet: ${:.2} over {} trading days",
        calendar.net(),
        calendar.trading_days()
    );

    Ok(())
}
