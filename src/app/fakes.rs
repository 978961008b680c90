use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::matching::MatchCandidate;
use crate::core::notify::{NotificationIcon, Notifier};
use crate::core::provider::{SearchResults, Session, SubtitleCatalog};
use crate::utils::{Error, SubarrResult};

/// In-memory catalog recording every call it receives.
#[derive(Default)]
pub struct FakeCatalog {
    pub login_fails: bool,
    pub download_fails: bool,
    pub movies: HashMap<(String, u16), Vec<MatchCandidate>>,
    pub episodes: HashMap<(String, u32, u32), Vec<MatchCandidate>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_movie(mut self, title: &str, year: u16, names: &[&str]) -> Self {
        self.movies.insert((title.to_string(), year), candidates(names));
        self
    }

    pub fn with_episode(mut self, series: &str, season: u32, episode: u32, names: &[&str]) -> Self {
        self.episodes
            .insert((series.to_string(), season, episode), candidates(names));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn candidates(names: &[&str]) -> Vec<MatchCandidate> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| MatchCandidate {
            name: name.to_string(),
            id: format!("sub-{i}"),
        })
        .collect()
}

#[async_trait]
impl SubtitleCatalog for FakeCatalog {
    fn name(&self) -> &str {
        "fake"
    }

    async fn login(&self) -> SubarrResult<Session> {
        self.record("login".to_string());
        if self.login_fails {
            return Err(Error::Other("bad credentials".to_string()));
        }
        Ok(Session::with_cookies(vec!["Login=ok".to_string()]))
    }

    async fn search_movie(
        &self,
        _session: &Session,
        title: &str,
        year: u16,
    ) -> SubarrResult<SearchResults> {
        self.record(format!("movie {title} {year}"));
        Ok(SearchResults {
            reference: Some(format!("film-{title}")),
            candidates: self
                .movies
                .get(&(title.to_string(), year))
                .cloned()
                .unwrap_or_default(),
        })
    }

    async fn search_episode(
        &self,
        _session: &Session,
        series: &str,
        season: u32,
        episode: u32,
    ) -> SubarrResult<SearchResults> {
        self.record(format!("episode {series} {season} {episode}"));
        Ok(SearchResults {
            reference: None,
            candidates: self
                .episodes
                .get(&(series.to_string(), season, episode))
                .cloned()
                .unwrap_or_default(),
        })
    }

    async fn download(
        &self,
        session: &Session,
        reference: Option<&str>,
        subtitle_id: &str,
    ) -> SubarrResult<Vec<u8>> {
        assert!(session.cookie_header().is_some());
        self.record(format!("download {} {subtitle_id}", reference.unwrap_or("-")));
        if self.download_fails {
            return Err(Error::Other("HTTP 500".to_string()));
        }
        Ok(format!("subtitle {subtitle_id}").into_bytes())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(String, NotificationIcon)>>,
}

impl RecordingNotifier {
    pub fn icons(&self) -> Vec<NotificationIcon> {
        self.messages.lock().unwrap().iter().map(|(_, icon)| *icon).collect()
    }

    pub fn last_message(&self) -> Option<String> {
        self.messages.lock().unwrap().last().map(|(m, _)| m.clone())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, icon: NotificationIcon, _open_log: bool) {
        self.messages.lock().unwrap().push((message.to_string(), icon));
    }
}
