use thiserror::Error;

/// Errors from check-in parsing and ingestion.
#[derive(Debug, Error)]
pub enum CheckinError {
    #[error("unsupported import format: {filename} (expected .csv or .json)")]
    UnsupportedFormat { filename: String },

    #[error("malformed {format} input: {reason}")]
    Malformed { format: &'static str, reason: String },

    #[error("feed fetch failed: {0}")]
    Feed(#[from] beerdb_match::MatchError),

    #[error("feed parse failed: {0}")]
    FeedParse(#[from] feed_rs::parser::ParseFeedError),

    #[error(transparent)]
    Db(#[from] beerdb_db::DbError),
}
