//! Transcript comparison for pronunciation practice
//!
//! The client runs the browser's speech recognizer and submits the transcript;
//! these functions turn the reference sentence and the transcript into
//! comparable word lists and score their overlap on a 0–100 scale.

use std::collections::HashSet;

/// Score returned when the normalized texts are identical
pub const PERFECT_SCORE: u8 = 100;

/// Normalize text for comparison.
///
/// Applies, in order:
/// 1. Lowercase
/// 2. Remove hyphens (`"well-known"` becomes `"wellknown"`)
/// 3. Drop every character that is not `[A-Za-z0-9_]` or whitespace
/// 4. Collapse whitespace runs to a single space and trim
///
/// ```
/// use esl_common::text::normalize;
///
/// assert_eq!(normalize("  Next.js is GREAT! "), "nextjs is great");
/// assert_eq!(normalize("A well-known\tfact"), "a wellknown fact");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|&c| c != '-')
        .filter(|&c| is_word_char(c) || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Word-overlap similarity between a reference sentence and a transcript.
///
/// Every reference word (counted per occurrence) that appears anywhere in the
/// transcript is a match. The denominator is the longer of the two word
/// lists, so extra filler words in the transcript lower the score.
///
/// Returns [`PERFECT_SCORE`] when the normalized texts are byte-equal, and 0
/// when either side has no words left after normalization.
///
/// ```
/// use esl_common::text::similarity_score;
///
/// assert_eq!(similarity_score("Hello world", "Hello world"), 100);
/// assert_eq!(similarity_score("I like cats", "I like dogs"), 67);
/// assert_eq!(similarity_score("a b", "a b c"), 67);
/// ```
pub fn similarity_score(reference: &str, transcript: &str) -> u8 {
    let reference = normalize(reference);
    let transcript = normalize(transcript);

    if reference == transcript {
        return PERFECT_SCORE;
    }

    let reference_words: Vec<&str> = reference.split(' ').filter(|w| !w.is_empty()).collect();
    let transcript_words: Vec<&str> = transcript.split(' ').filter(|w| !w.is_empty()).collect();

    if reference_words.is_empty() || transcript_words.is_empty() {
        return 0;
    }

    let spoken: HashSet<&str> = transcript_words.iter().copied().collect();
    let matches = reference_words.iter().filter(|w| spoken.contains(*w)).count();
    let denominator = reference_words.len().max(transcript_words.len());

    (matches as f64 / denominator as f64 * 100.0).round() as u8
}
