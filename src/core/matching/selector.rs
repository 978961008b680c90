use tracing::info;

use super::similarity::{common_words_in_sentences, SimilarityResult};
use super::MatchCandidate;

/// Pick the candidate whose name shares the highest weighted words with the
/// file name. Ties keep the earliest candidate.
pub fn find_closest_match<'c, S: AsRef<str>>(
    filename_no_extension: &str,
    candidates: &'c [MatchCandidate],
    exclude_list: &[S],
) -> Option<&'c MatchCandidate> {
    info!(
        "Looking for closest match for \"{}\" from: [{}]",
        filename_no_extension,
        candidates.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
    );

    let mut best: Option<(&MatchCandidate, SimilarityResult)> = None;
    for candidate in candidates {
        let similarity =
            common_words_in_sentences(filename_no_extension, &candidate.name, exclude_list);
        let improves = best.as_ref().map_or(true, |(_, top)| similarity.mark > top.mark);
        if improves {
            best = Some((candidate, similarity));
        }
    }

    let (best_match, similarity) = best?;
    info!("filename:  \"{filename_no_extension}\"");
    info!("best match: \"{}\"", best_match.name);
    info!("common words: [\"{}\"]", similarity.common_words.join("\", \""));
    info!("common words mark: {:.2}", similarity.mark);
    Some(best_match)
}
