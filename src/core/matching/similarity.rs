use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::core::text::{clean_text, split_text};

pub const SPECIAL_EDITION_MARK: f64 = 4.0;
pub const RIP_MARK: f64 = 3.0;
pub const ENCODING_MARK: f64 = 1.2;
pub const DIMENSION_MARK: f64 = 0.8;
pub const AUDIO_MARK: f64 = 0.5;
pub const COMMON_WORDS_MARK: f64 = 0.1;

// Words split in two by the normalizer ("web dl", "final cut") share the tier weight.
static WORD_WEIGHTS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("theatrical", SPECIAL_EDITION_MARK),
        ("final", SPECIAL_EDITION_MARK / 2.0),
        ("cut", SPECIAL_EDITION_MARK / 2.0),
        ("bluray", RIP_MARK),
        ("hddvd", RIP_MARK),
        ("webrip", RIP_MARK),
        ("hdtv", RIP_MARK),
        ("web", RIP_MARK / 2.0),
        ("dl", RIP_MARK / 2.0),
        ("x264", ENCODING_MARK),
        ("x265", ENCODING_MARK),
        ("1080p", DIMENSION_MARK),
        ("720p", DIMENSION_MARK),
        ("5.1", AUDIO_MARK),
        ("dts", AUDIO_MARK),
        ("dd5", AUDIO_MARK),
        ("ac3", AUDIO_MARK),
        ("the", COMMON_WORDS_MARK),
    ])
});

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    pub common_words: Vec<String>,
    pub mark: f64,
}

fn word_mark(word: &str) -> f64 {
    match WORD_WEIGHTS.get(word) {
        Some(weight) => *weight,
        None => word.chars().count().min(5) as f64 / 5.0,
    }
}

pub fn calculate_similarity_mark<S: AsRef<str>>(words: &[S]) -> f64 {
    words.iter().fold(0.0, |acc, w| acc + word_mark(w.as_ref()))
}

/// Words of `s1` (in order, duplicates kept) that also appear in `s2`,
/// ignoring single letters and anything in `exclude_list`.
pub fn common_words_in_sentences<S: AsRef<str>>(
    s1: &str,
    s2: &str,
    exclude_list: &[S],
) -> SimilarityResult {
    let split1 = split_text(&clean_text(s1));
    let split2 = split_text(&clean_text(s2));

    let common_words: Vec<String> = split1
        .into_iter()
        .filter(|w| w.chars().count() > 1)
        .filter(|w| !exclude_list.iter().any(|e| e.as_ref() == w.as_str()))
        .filter(|w| split2.contains(w))
        .collect();
    let mark = calculate_similarity_mark(&common_words);

    debug!(
        "\"{s1}\" & \"{s2}\" have {} words in common [{}] with total mark: {mark}",
        common_words.len(),
        common_words.join("#")
    );
    SimilarityResult { common_words, mark }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTHING: [&str; 0] = [];

    #[test]
    fn unknown_words_use_length() {
        assert_eq!(calculate_similarity_mark(&["a"]), 0.2);
        assert_eq!(calculate_similarity_mark(&["ab"]), 0.4);
        assert_eq!(calculate_similarity_mark(&["abcdef"]), 1.0);
    }

    #[test]
    fn known_words_use_table() {
        assert_eq!(calculate_similarity_mark(&["x264"]), ENCODING_MARK);
        assert_eq!(calculate_similarity_mark(&["720p"]), DIMENSION_MARK);
        assert_eq!(calculate_similarity_mark(&["web", "dl"]), RIP_MARK);
        assert_eq!(calculate_similarity_mark(&["final", "cut"]), SPECIAL_EDITION_MARK);
        assert_eq!(calculate_similarity_mark(&NOTHING), 0.0);
    }

    #[test]
    fn common_words_follow_first_sentence_order() {
        let r = common_words_in_sentences(
            "Frozen.2013.1080p.BluRay.x264-HebDub",
            "Frozen.2013.1080p.BluRay.x264-SPARKS",
            &["frozen", "2013"],
        );
        assert_eq!(r.common_words, ["1080p", "bluray", "x264"]);
        assert!((r.mark - (DIMENSION_MARK + RIP_MARK + ENCODING_MARK)).abs() < 1e-9);
    }

    #[test]
    fn single_letters_and_empty_tokens_are_ignored() {
        let r = common_words_in_sentences("a..b.cd", "a b cd", &NOTHING);
        assert_eq!(r.common_words, ["cd"]);
    }

    #[test]
    fn duplicates_count_twice() {
        let r = common_words_in_sentences("the.the.movie", "the movie", &["movie"]);
        assert_eq!(r.common_words, ["the", "the"]);
        assert!((r.mark - 2.0 * COMMON_WORDS_MARK).abs() < 1e-9);
    }
}
