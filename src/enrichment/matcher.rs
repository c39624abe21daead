//! Fuzzy matching of provider candidates against a request.
//!
//! Provider catalogs disagree on formatting: "Discovery" vs
//! "Discovery (2001 Remaster)" vs "DISCOVERY - Deluxe Edition". Both sides
//! are normalized first (diacritics folded, case folded, bracketed and
//! dash-suffixed qualifiers removed, punctuation collapsed) and then compared
//! with a word-order-insensitive Levenshtein ratio.
//!
//! Artist similarity gates the result: below `artist_floor` a candidate is
//! rejected no matter how well the title matches.

use std::sync::LazyLock;

use regex::Regex;
use strsim::normalized_levenshtein;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::domain::{Candidate, EnrichmentRequest, MatchType, ScoredCandidate};
use crate::config::MatchingConfig;

/// Trailing edition qualifiers written with a dash instead of brackets,
/// e.g. "Abbey Road - 2019 Remaster" or "Rumours - Super Deluxe Edition".
static DASH_QUALIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\s+[-–—]\s+[^-–—]*\b",
        r"(?:remaster(?:ed)?|deluxe|edition|version|anniversary|expanded|reissue",
        r"|mono|stereo|live|bonus)",
        r"\b[^-–—]*$",
    ))
    .expect("edition qualifier pattern is valid")
});

/// Scores candidates and picks the best one per match type
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    config: MatchingConfig,
}

impl FuzzyMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Acceptance threshold for a match type
    pub fn threshold(&self, match_type: MatchType) -> f64 {
        match match_type {
            MatchType::Album => self.config.album_threshold,
            MatchType::Track => self.config.track_threshold,
            MatchType::Artist => self.config.artist_threshold,
        }
    }

    /// Confidence in [0, 1] that `candidate` is what `request` asks for.
    ///
    /// Artist hits are scored on the artist name alone. Album and track hits
    /// combine title and artist similarity by the configured weights, after
    /// the artist floor check.
    pub fn score(&self, request: &EnrichmentRequest, candidate: &Candidate) -> f64 {
        let artist_similarity = request
            .artist_variants()
            .iter()
            .map(|artist| self.similarity(artist, &candidate.artist_name))
            .fold(0.0_f64, f64::max);

        match candidate.match_type {
            MatchType::Artist => artist_similarity,
            MatchType::Album | MatchType::Track => {
                if artist_similarity < self.config.artist_floor {
                    return 0.0;
                }

                let title_similarity = self.similarity(&request.album, &candidate.title);
                let total = self.config.title_weight + self.config.artist_weight;
                if total <= 0.0 {
                    return title_similarity;
                }

                let combined = (self.config.title_weight * title_similarity
                    + self.config.artist_weight * artist_similarity)
                    / total;
                combined.clamp(0.0, 1.0)
            }
        }
    }

    /// Highest-scoring candidate of the list; ties go to the first seen
    pub fn best(
        &self,
        request: &EnrichmentRequest,
        candidates: Vec<Candidate>,
    ) -> Option<ScoredCandidate> {
        let mut best: Option<ScoredCandidate> = None;

        for candidate in candidates {
            let confidence = self.score(request, &candidate);
            let better = best.as_ref().is_none_or(|b| confidence > b.confidence);
            if better {
                best = Some(ScoredCandidate {
                    candidate,
                    confidence,
                });
            }
        }

        best
    }

    /// Best candidate if it clears the threshold for its match type
    pub fn accept(
        &self,
        request: &EnrichmentRequest,
        match_type: MatchType,
        candidates: Vec<Candidate>,
    ) -> Option<ScoredCandidate> {
        let candidates = candidates
            .into_iter()
            .filter(|c| c.match_type == match_type)
            .collect();

        self.best(request, candidates)
            .filter(|scored| scored.confidence >= self.threshold(match_type))
    }

    /// Normalized similarity of two free-text strings
    pub fn similarity(&self, query: &str, candidate: &str) -> f64 {
        let query = normalize(query);
        let candidate = normalize(candidate);

        if query.is_empty() || candidate.is_empty() {
            return 0.0;
        }
        if query == candidate {
            return 1.0;
        }

        let ratio = normalized_levenshtein(&sort_words(&query), &sort_words(&candidate));

        if contains_words(&candidate, &query) {
            ratio.max(self.config.containment_score)
        } else {
            ratio
        }
    }
}

/// Fold a title or artist name into a comparable form
pub fn normalize(text: &str) -> String {
    let without_brackets = strip_brackets(text);
    let without_suffix = DASH_QUALIFIER.replace(&without_brackets, "");

    let folded: String = without_suffix
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c == '&' { ' ' } else { c })
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    folded
        .split_whitespace()
        .filter(|w| *w != "and")
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove every `(...)`, `[...]` and `{...}` segment, nested or not
fn strip_brackets(text: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }

    out
}

fn sort_words(text: &str) -> String {
    let mut words: Vec<&str> = text.split_whitespace().collect();
    words.sort_unstable();
    words.join(" ")
}

/// Whether `needle` appears in `haystack` as a run of whole words
fn contains_words(haystack: &str, needle: &str) -> bool {
    let hay: Vec<&str> = haystack.split_whitespace().collect();
    let needle: Vec<&str> = needle.split_whitespace().collect();

    !needle.is_empty()
        && needle.len() <= hay.len()
        && hay.windows(needle.len()).any(|w| w == needle.as_slice())
}
