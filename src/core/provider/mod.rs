pub mod ktuvit;
pub mod screwzira;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::ProviderKind;
use crate::core::cache::ShowIdCache;
use crate::core::matching::MatchCandidate;
use crate::utils::{Error, SubarrResult};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/70.0.3528.4 Safari/537.36";

/// Authenticated state handed to every catalog call after login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    cookies: Vec<String>,
}

impl Session {
    /// For catalogs that need no login.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_cookies(cookies: Vec<String>) -> Self {
        Self { cookies }
    }

    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            None
        } else {
            Some(self.cookies.join("; "))
        }
    }
}

/// Candidates returned by one search, plus the catalog-side key needed to download them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub reference: Option<String>,
    pub candidates: Vec<MatchCandidate>,
}

impl SearchResults {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[async_trait]
pub trait SubtitleCatalog: Send + Sync {
    fn name(&self) -> &str;

    async fn login(&self) -> SubarrResult<Session>;

    async fn search_movie(
        &self,
        session: &Session,
        title: &str,
        year: u16,
    ) -> SubarrResult<SearchResults>;

    async fn search_episode(
        &self,
        session: &Session,
        series: &str,
        season: u32,
        episode: u32,
    ) -> SubarrResult<SearchResults>;

    async fn download(
        &self,
        session: &Session,
        reference: Option<&str>,
        subtitle_id: &str,
    ) -> SubarrResult<Vec<u8>>;
}

pub fn from_config(
    config: &crate::config::Config,
    kind: ProviderKind,
) -> Result<Box<dyn SubtitleCatalog>, Error> {
    let base_url = config.provider.base_url.clone();
    match kind {
        ProviderKind::Screwzira => Ok(Box::new(screwzira::ScrewziraCatalog::new(base_url))),
        ProviderKind::Ktuvit => {
            let (Some(email), Some(password)) =
                (&config.provider.email, &config.provider.password)
            else {
                return Err(Error::Other(
                    "provider is 'ktuvit' but provider.email / provider.password are missing"
                        .to_string(),
                ));
            };
            let cache =
                ShowIdCache::load(&PathBuf::from(&config.cache.dir), ktuvit::SHOW_ID_CACHE_ID);
            Ok(Box::new(ktuvit::KtuvitCatalog::new(
                base_url,
                email.clone(),
                password.clone(),
                cache,
            )))
        }
    }
}

/// Turn a non-2xx response into an error carrying status and body.
pub(crate) async fn ensure_success(
    resp: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Other(format!("{what} failed: HTTP {status} body={body}")))
}
