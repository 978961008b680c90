use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{trace, warn};

use super::types::{FileClassification, TitleReplacer};
use crate::core::text::clean_text;

// `S01E02`, `s1e2`, `1x02`... season and episode must both be captured
static EPISODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.+?)[Ss]?0?([0-9]+)?[xeE]0?([0-9]+)").unwrap());
// `Title.2019.` or `Title 2019 `
static MOVIE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([ .\w']+?)[. ]([0-9]{4})[. ]").unwrap());
// `Title (2019)`
static MOVIE_FOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^(]+)\s+\(([0-9]{4})\)").unwrap());

struct ClassifyInput<'a> {
    filename_no_extension: &'a str,
    relative_path: &'a Path,
    parent_folder: Option<&'a str>,
}

type Rule = fn(&ClassifyInput<'_>, &dyn TitleReplacer) -> Option<FileClassification>;

const RULES: [(&str, Rule); 3] = [
    ("episode", episode_rule),
    ("movie", movie_rule),
    ("movie folder", movie_folder_rule),
];

/// Classify a media file name, falling back on its parent folder for movies.
/// `None` means the name matched no known pattern.
pub fn classify(
    filename_no_extension: &str,
    relative_path: &Path,
    parent_folder: Option<&str>,
    replacer: &dyn TitleReplacer,
) -> Option<FileClassification> {
    let input = ClassifyInput {
        filename_no_extension,
        relative_path,
        parent_folder,
    };

    RULES.iter().find_map(|(name, rule)| {
        let classification = rule(&input, replacer)?;
        trace!("Classification match {name}: {classification:?}");
        Some(classification)
    })
}

/// Captured digits only fail to parse on overflow; clamp instead of dropping the match.
fn saturating_number(digits: &str, what: &str, filename: &str) -> u32 {
    digits.parse::<u32>().unwrap_or_else(|_| {
        warn!("{what} number {digits} in \"{filename}\" is too large, using {}", u32::MAX);
        u32::MAX
    })
}

fn episode_rule(
    input: &ClassifyInput<'_>,
    replacer: &dyn TitleReplacer,
) -> Option<FileClassification> {
    let caps = EPISODE_RE.captures(input.filename_no_extension)?;
    let series = caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty())?;
    let season = saturating_number(caps.get(2)?.as_str(), "Season", input.filename_no_extension);
    let episode = saturating_number(caps.get(3)?.as_str(), "Episode", input.filename_no_extension);

    Some(FileClassification::Episode {
        filename_no_extension: input.filename_no_extension.to_string(),
        relative_path: input.relative_path.to_path_buf(),
        series: replacer.replace_title_if_needed(&clean_text(series)),
        season,
        episode,
    })
}

fn movie_rule(
    input: &ClassifyInput<'_>,
    replacer: &dyn TitleReplacer,
) -> Option<FileClassification> {
    movie_from(&MOVIE_RE, input.filename_no_extension, input, replacer)
}

fn movie_folder_rule(
    input: &ClassifyInput<'_>,
    replacer: &dyn TitleReplacer,
) -> Option<FileClassification> {
    let folder = input.parent_folder.filter(|f| !f.is_empty())?;
    movie_from(&MOVIE_FOLDER_RE, folder, input, replacer)
}

fn movie_from(
    re: &Regex,
    haystack: &str,
    input: &ClassifyInput<'_>,
    replacer: &dyn TitleReplacer,
) -> Option<FileClassification> {
    let caps = re.captures(haystack)?;
    let title = caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty())?;
    let year = caps.get(2)?.as_str().parse::<u16>().ok()?;

    Some(FileClassification::Movie {
        filename_no_extension: input.filename_no_extension.to_string(),
        relative_path: input.relative_path.to_path_buf(),
        movie_name: replacer.replace_title_if_needed(&clean_text(title)),
        movie_year: year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::naming::NoReplacement;

    fn run(name: &str, parent: Option<&str>) -> Option<FileClassification> {
        classify(name, Path::new("."), parent, &NoReplacement)
    }

    fn movie(name: &str, title: &str, year: u16) -> FileClassification {
        FileClassification::Movie {
            filename_no_extension: name.to_string(),
            relative_path: ".".into(),
            movie_name: title.to_string(),
            movie_year: year,
        }
    }

    fn episode(name: &str, series: &str, season: u32, ep: u32) -> FileClassification {
        FileClassification::Episode {
            filename_no_extension: name.to_string(),
            relative_path: ".".into(),
            series: series.to_string(),
            season,
            episode: ep,
        }
    }

    #[test]
    fn movie_name_ends_with_number() {
        let name = "Deadpool.2.2018.THEATRICAL.1080p.BluRay.x264-ROVERS";
        assert_eq!(run(name, None), Some(movie(name, "deadpool 2", 2018)));
    }

    #[test]
    fn movie_name_with_spaces() {
        let name = "Deadpool 2 2018 THEATRICAL 1080p BluRay x264-ROVERS";
        assert_eq!(run(name, None), Some(movie(name, "deadpool 2", 2018)));
    }

    #[test]
    fn movie_name_with_irrelevant_numbers() {
        let name = "The.House.That.Jack.Built.2018.1080p.AMZN.WEB-DL.DDP5.1.H.264-NTG";
        assert_eq!(run(name, None), Some(movie(name, "the house that jack built", 2018)));
    }

    #[test]
    fn frozen_2() {
        let name = "Frozen.2.2019.1080p.AMZN.WEB-DL.DDP5.1.H264-CMRG";
        assert_eq!(run(name, None), Some(movie(name, "frozen 2", 2019)));
    }

    #[test]
    fn special_episode_season_zero() {
        let name = "Stranger.Things.S00E01.1080p.WEB.x264-STRiFE";
        assert_eq!(run(name, None), Some(episode(name, "stranger things", 0, 1)));
    }

    #[test]
    fn lowercase_episode() {
        let name = "living.with.yourself.s01e01.internal.hdr.1080p.web.h265-paleale";
        assert_eq!(run(name, None), Some(episode(name, "living with yourself", 1, 1)));
    }

    #[test]
    fn episode_with_x_separator() {
        let name = "The.Office.3x12.HDTV";
        assert_eq!(run(name, None), Some(episode(name, "the office", 3, 12)));
    }

    #[test]
    fn episode_double_digit_season() {
        let name = "Grey's.Anatomy.S15E07.720p";
        assert_eq!(run(name, None), Some(episode(name, "grey's anatomy", 15, 7)));
    }

    #[test]
    fn parent_folder_fallback() {
        assert_eq!(
            run("movie", Some("Movie Title (2019)")),
            Some(movie("movie", "movie title", 2019))
        );
    }

    #[test]
    fn filename_wins_over_parent_folder() {
        let name = "Arrival.2016.1080p";
        assert_eq!(
            run(name, Some("Something Else (1999)")),
            Some(movie(name, "arrival", 2016))
        );
    }

    #[test]
    fn unclassifiable() {
        assert_eq!(run("holiday_video", None), None);
        assert_eq!(run("holiday_video", Some("Holidays")), None);
        assert_eq!(run("holiday_video", Some("")), None);
    }

    #[test]
    fn replacement_hook_applies_to_series() {
        struct Aliases;
        impl TitleReplacer for Aliases {
            fn replace_title_if_needed(&self, text: &str) -> String {
                if text == "the office" { "the office us".to_string() } else { text.to_string() }
            }
        }
        let got = classify("The.Office.S02E01", Path::new("."), None, &Aliases).unwrap();
        assert_eq!(got, episode("The.Office.S02E01", "the office us", 2, 1));
    }

    #[test]
    fn oversized_episode_numbers_saturate() {
        let name = "Show.S99999999999E01";
        assert_eq!(run(name, None), Some(episode(name, "show", u32::MAX, 1)));
        let name = "Show.S01E99999999999";
        assert_eq!(run(name, None), Some(episode(name, "show", 1, u32::MAX)));
    }

    #[test]
    fn reclassifying_is_stable() {
        for name in [
            "Stranger.Things.S00E01.1080p.WEB.x264-STRiFE",
            "Frozen.2.2019.1080p.AMZN.WEB-DL.DDP5.1.H264-CMRG",
        ] {
            let first = run(name, None).unwrap();
            let second = run(first.filename_no_extension(), None).unwrap();
            assert_eq!(first, second);
        }
    }
}
