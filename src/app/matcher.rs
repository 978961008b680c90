use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::config::MediaConfig;
use crate::core::fs::{subtitle_destination, write_subtitle, MediaFile};
use crate::core::matching::find_closest_match;
use crate::core::naming::{classify, find_alternative_name, FileClassification};
use crate::core::notify::{NotificationIcon, Notifier};
use crate::core::provider::{SearchResults, Session, SubtitleCatalog};
use crate::utils::MatchError;

/// How a single media file ended when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Downloaded { destination: PathBuf },
    AlreadyExists { destination: PathBuf },
}

#[derive(Debug, Clone)]
enum SessionState {
    Unauthenticated,
    Authenticated(Session),
    Failed,
}

/// Drives one catalog: login once, search, retry with an alternate title,
/// pick the closest subtitle, download and write it.
pub struct SubtitleMatcher<'a> {
    catalog: &'a dyn SubtitleCatalog,
    notifier: &'a dyn Notifier,
    media: &'a MediaConfig,
    session: SessionState,
    provider_calls: usize,
}

impl<'a> SubtitleMatcher<'a> {
    pub fn new(
        catalog: &'a dyn SubtitleCatalog,
        notifier: &'a dyn Notifier,
        media: &'a MediaConfig,
    ) -> Self {
        Self {
            catalog,
            notifier,
            media,
            session: SessionState::Unauthenticated,
            provider_calls: 0,
        }
    }

    /// Number of requests sent to the catalog so far.
    pub fn provider_calls(&self) -> usize {
        self.provider_calls
    }

    pub async fn process(&mut self, file: &MediaFile) -> Result<FileOutcome, MatchError> {
        let Some(classification) = classify(
            &file.filename_no_extension,
            &file.relative_path,
            file.parent_folder.as_deref(),
            self.media,
        ) else {
            warn!("Unable to classify '{}'", file.path.display());
            self.notifier.notify(
                "Unable to classify input file as movie or episode",
                NotificationIcon::Failed,
                true,
            );
            return Err(MatchError::UnclassifiableFilename);
        };
        info!("Classified '{}' as {}", file.path.display(), classification.context_message());

        self.handle(&classification).await
    }

    pub async fn handle(
        &mut self,
        classification: &FileClassification,
    ) -> Result<FileOutcome, MatchError> {
        let context = classification.context_message();

        let session = match self.ensure_session().await {
            Ok(session) => session,
            Err(e) => {
                self.notifier.notify(
                    &format!("Failed to login to {}", self.catalog.name()),
                    NotificationIcon::Failed,
                    true,
                );
                return Err(e);
            }
        };

        let results = self.search(&session, classification).await;
        if results.is_empty() {
            self.notifier.notify(
                &format!("No subtitle found for {context}"),
                NotificationIcon::NotFound,
                true,
            );
            return Err(MatchError::NoCandidatesFound { context });
        }

        let exclude_list = classification.exclude_list();
        let Some(best) = find_closest_match(
            classification.filename_no_extension(),
            &results.candidates,
            &exclude_list,
        ) else {
            self.notifier.notify(
                &format!("Unable to pick a subtitle for {context}"),
                NotificationIcon::Failed,
                true,
            );
            return Err(MatchError::SelectionFailure { context });
        };

        self.provider_calls += 1;
        let content = match self
            .catalog
            .download(&session, results.reference.as_deref(), &best.id)
            .await
        {
            Ok(content) => content,
            Err(source) => {
                error!("Failed downloading subtitle {} for {context}: {source}", best.id);
                self.notifier.notify(
                    &format!("Failed downloading subtitle for {context}"),
                    NotificationIcon::Failed,
                    false,
                );
                return Err(MatchError::DownloadFailure { context, source });
            }
        };

        let destination = subtitle_destination(
            classification.relative_path(),
            classification.filename_no_extension(),
            self.media.language_code(),
        );
        if destination.exists() {
            warn!("Subtitles already exist at '{}'", destination.display());
            self.notifier.notify(
                &format!("{} subtitles already exist for {context}", self.media.language_code()),
                NotificationIcon::Warning,
                false,
            );
            return Ok(FileOutcome::AlreadyExists { destination });
        }

        if let Err(source) = write_subtitle(&destination, &content).await {
            self.notifier.notify(
                &format!("Failed writing subtitle for {context}"),
                NotificationIcon::Failed,
                true,
            );
            return Err(MatchError::WriteFailure {
                path: destination,
                source,
            });
        }

        info!("Wrote subtitle '{}'", destination.display());
        self.notifier.notify(
            &format!("Successfully downloaded Subtitles for {context}"),
            NotificationIcon::Download,
            false,
        );
        Ok(FileOutcome::Downloaded { destination })
    }

    async fn ensure_session(&mut self) -> Result<Session, MatchError> {
        match &self.session {
            SessionState::Authenticated(session) => return Ok(session.clone()),
            SessionState::Failed => {
                return Err(MatchError::AuthenticationFailure {
                    provider: self.catalog.name().to_string(),
                })
            }
            SessionState::Unauthenticated => {}
        }

        self.provider_calls += 1;
        match self.catalog.login().await {
            Ok(session) => {
                info!("Logged in to {}", self.catalog.name());
                self.session = SessionState::Authenticated(session.clone());
                Ok(session)
            }
            Err(e) => {
                error!("Failed to login to {}: {e}", self.catalog.name());
                self.session = SessionState::Failed;
                Err(MatchError::AuthenticationFailure {
                    provider: self.catalog.name().to_string(),
                })
            }
        }
    }

    async fn search(
        &mut self,
        session: &Session,
        classification: &FileClassification,
    ) -> SearchResults {
        match classification {
            FileClassification::Movie { movie_name, movie_year, .. } => {
                let first = self.search_movie(session, movie_name, *movie_year).await;
                if !first.is_empty() {
                    return first;
                }
                match find_alternative_name(movie_name) {
                    Some(alternative) if alternative != *movie_name => {
                        info!("Retrying with alternative name \"{alternative}\"");
                        self.search_movie(session, &alternative, *movie_year).await
                    }
                    _ => first,
                }
            }
            FileClassification::Episode { series, season, episode, .. } => {
                self.provider_calls += 1;
                self.catalog
                    .search_episode(session, series, *season, *episode)
                    .await
                    .unwrap_or_else(|e| {
                        error!("Searching {series} season {season} episode {episode} failed: {e}");
                        SearchResults::empty()
                    })
            }
        }
    }

    async fn search_movie(&mut self, session: &Session, title: &str, year: u16) -> SearchResults {
        self.provider_calls += 1;
        self.catalog
            .search_movie(session, title, year)
            .await
            .unwrap_or_else(|e| {
                error!("Searching \"{title}\" ({year}) failed: {e}");
                SearchResults::empty()
            })
    }
}
