use std::path::{Path, PathBuf};

use crate::core::text::{clean_text, split_text, to_title_case};

/// What a media file turned out to be, judging by its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileClassification {
    Movie {
        filename_no_extension: String,
        relative_path: PathBuf,
        movie_name: String,
        movie_year: u16,
    },
    Episode {
        filename_no_extension: String,
        relative_path: PathBuf,
        series: String,
        season: u32,
        episode: u32,
    },
}

impl FileClassification {
    pub fn filename_no_extension(&self) -> &str {
        match self {
            Self::Movie {
                filename_no_extension,
                ..
            }
            | Self::Episode {
                filename_no_extension,
                ..
            } => filename_no_extension,
        }
    }

    pub fn relative_path(&self) -> &Path {
        match self {
            Self::Movie { relative_path, .. } | Self::Episode { relative_path, .. } => {
                relative_path
            }
        }
    }

    /// Words of the query itself; they appear in every candidate and must not count.
    pub fn exclude_list(&self) -> Vec<String> {
        match self {
            Self::Movie { movie_name, movie_year, .. } => {
                let mut words = split_text(&clean_text(movie_name));
                words.push(movie_year.to_string());
                words
            }
            Self::Episode { series, .. } => split_text(&clean_text(series)),
        }
    }

    /// Human readable description used in logs and notifications.
    pub fn context_message(&self) -> String {
        match self {
            Self::Movie { movie_name, movie_year, .. } => {
                format!("movie \"{}\" ({})", to_title_case(movie_name), movie_year)
            }
            Self::Episode { series, season, episode, .. } => format!(
                "series \"{}\" season {} episode {}",
                to_title_case(series),
                season,
                episode
            ),
        }
    }
}

/// Title alias hook applied to every classified name.
pub trait TitleReplacer {
    fn replace_title_if_needed(&self, text: &str) -> String;
}

/// Keeps titles untouched.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReplacement;

#[cfg(test)]
impl TitleReplacer for NoReplacement {
    fn replace_title_if_needed(&self, text: &str) -> String {
        text.to_string()
    }
}
