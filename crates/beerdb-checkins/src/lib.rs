//! Check-in ingestion: export-file parsing, batch import, and RSS feed
//! sync. Raw check-ins land in `raw_checkins`; tastings are derived for
//! every check-in whose beer is a matched catalog product.

pub mod error;
pub mod ingest;
pub mod parse;
pub mod rss;

pub use error::CheckinError;
pub use ingest::import_checkins;
pub use parse::parse_export;
pub use rss::{sync_feeds, FeedSummary};
