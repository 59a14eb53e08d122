use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("product record {code} is missing required field {field}")]
    MissingField { code: String, field: String },

    #[error(transparent)]
    Db(#[from] beerdb_db::DbError),
}
