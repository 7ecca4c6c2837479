pub mod export;
pub mod filter;
pub mod loader;
pub mod trade;

pub use export::{export_file_name, save_csv, to_csv_string, write_csv};
pub use filter::filter_trades;
pub use loader::{load_csv, load_from_reader};
pub use trade::{AccountMode, Outcome, Side, TradeError, TradeRecord};
