//! Name-similarity scoring for match candidates.

use strsim::normalized_levenshtein;

/// Similarity between two names on a 0..=100 scale. Implementations must
/// be symmetric enough for ranking; exact calibration only matters around
/// the acceptance threshold.
pub trait Scorer {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// Accept a candidate only when its score exceeds this.
pub const ACCEPT_THRESHOLD: u8 = 40;

/// Case-insensitive normalized Levenshtein similarity, scaled to 0..=100.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinScorer;

impl Scorer for LevenshteinScorer {
    fn score(&self, a: &str, b: &str) -> u8 {
        let similarity = normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase());
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (similarity * 100.0).round().clamp(0.0, 100.0) as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_score_100() {
        assert_eq!(LevenshteinScorer.score("Lervig Lucky Jack", "Lervig Lucky Jack"), 100);
    }

    #[test]
    fn case_differences_do_not_count() {
        assert_eq!(LevenshteinScorer.score("LERVIG lucky JACK", "lervig Lucky jack"), 100);
    }

    #[test]
    fn unrelated_names_fall_below_threshold() {
        let score = LevenshteinScorer.score("Nøgne Ø Imperial Stout", "Frydenlund Fatøl");
        assert!(score <= ACCEPT_THRESHOLD, "got {score}");
    }

    #[test]
    fn near_matches_clear_threshold() {
        let score = LevenshteinScorer.score("Lervig Supersonic IPA", "Lervig Supersonic");
        assert!(score > ACCEPT_THRESHOLD, "got {score}");
    }

    #[test]
    fn empty_against_empty_is_full_score() {
        assert_eq!(LevenshteinScorer.score("", ""), 100);
    }
}
