pub mod report;

pub use report::{JournalEngine, JournalReport};
