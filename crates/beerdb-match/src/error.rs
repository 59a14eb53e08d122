use thiserror::Error;

/// Errors from community-service matching and enrichment.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("beer page not found: {url}")]
    NotFound { url: String },

    #[error("no beer id in url: {url}")]
    MissingBeerId { url: String },

    #[error("product {retail_id} not found")]
    UnknownProduct { retail_id: i64 },

    #[error("correction {id} not found")]
    UnknownCorrection { id: i64 },

    #[error(transparent)]
    Db(#[from] beerdb_db::DbError),
}
