//! kakeibo-finance: receipt aggregation, outcome evaluation and reply formatting

pub mod aggregator;
pub mod outcome;
pub mod reply;

pub use aggregator::{LineReport, ReceiptAggregator};
pub use outcome::ReceiptOutcome;
pub use reply::ReplyFormatter;
