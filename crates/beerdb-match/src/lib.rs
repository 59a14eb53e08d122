//! Identity reconciliation against the community beer service: automatic
//! name matching, wrong-match corrections, and community-page enrichment.
//!
//! The community site serves HTML only; [`client`] does the fetching,
//! [`extract`] the regex/JSON-LD extraction, and the engines here drive
//! the database state machine (unmatched → matched → flagged/corrected).

pub mod client;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod queries;
pub mod score;
pub mod throttle;
pub mod wrong_match;

pub use client::{Candidate, CommunityClient};
pub use enrich::refresh_community;
pub use error::MatchError;
pub use matcher::{match_products, MatchSummary};
pub use queries::query_variants;
pub use score::{LevenshteinScorer, Scorer, ACCEPT_THRESHOLD};
pub use throttle::Throttle;
pub use wrong_match::{
    accept_wrong_match, submit_wrong_match, SubmitOutcome, WrongMatchPolicy,
};
