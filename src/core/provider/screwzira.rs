use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::matching::MatchCandidate;
use crate::utils::{Error, SubarrResult};

use super::{ensure_success, SearchResults, Session, SubtitleCatalog, USER_AGENT};

const DEFAULT_BASE_URL: &str = "http://api.screwzira.com";

#[derive(Debug, Serialize)]
struct Envelope<T> {
    request: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FindFilmRequest<'a> {
    search_phrase: &'a str,
    search_type: &'static str,
    version: &'static str,
    year: u16,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FindSeriesRequest<'a> {
    search_phrase: &'a str,
    search_type: &'static str,
    version: &'static str,
    season: u32,
    episode: u32,
}

#[derive(Debug, Serialize)]
struct DownloadRequest<'a> {
    #[serde(rename = "subtitleID")]
    subtitle_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<ResultEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResultEntry {
    subtitle_name: String,
    identifier: Value,
}

/// The API answers with a JSON document that is sometimes wrapped in a JSON string.
pub fn parse_search_results(body: &str) -> Result<Vec<MatchCandidate>, Error> {
    let value = match serde_json::from_str::<Value>(body)? {
        Value::String(inner) => serde_json::from_str::<Value>(&inner)?,
        other => other,
    };
    let parsed: SearchResponse = serde_json::from_value(value)?;

    Ok(parsed
        .results
        .unwrap_or_default()
        .into_iter()
        .map(|entry| MatchCandidate {
            name: entry.subtitle_name,
            id: match entry.identifier {
                Value::String(s) => s,
                other => other.to_string(),
            },
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct ScrewziraCatalog {
    base_url: String,
    client: reqwest::Client,
}

impl ScrewziraCatalog {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn search<T: Serialize + Send + Sync>(
        &self,
        path: &str,
        request: T,
    ) -> SubarrResult<SearchResults> {
        let url = self.url(path);
        debug!(target: "subarr::screwzira", url = %url, "Searching subtitles");

        let resp = self
            .client
            .post(url)
            .header("User-Agent", USER_AGENT)
            .json(&Envelope { request })
            .send()
            .await?;
        let body = ensure_success(resp, "Screwzira search").await?.text().await?;

        Ok(SearchResults {
            reference: None,
            candidates: parse_search_results(&body)?,
        })
    }
}

#[async_trait]
impl SubtitleCatalog for ScrewziraCatalog {
    fn name(&self) -> &str {
        "screwzira"
    }

    async fn login(&self) -> SubarrResult<Session> {
        Ok(Session::anonymous())
    }

    async fn search_movie(
        &self,
        _session: &Session,
        title: &str,
        year: u16,
    ) -> SubarrResult<SearchResults> {
        let request = FindFilmRequest {
            search_phrase: title,
            search_type: "FilmName",
            version: "1.0",
            year,
        };
        self.search("FindFilm", request).await
    }

    async fn search_episode(
        &self,
        _session: &Session,
        series: &str,
        season: u32,
        episode: u32,
    ) -> SubarrResult<SearchResults> {
        let request = FindSeriesRequest {
            search_phrase: series,
            search_type: "FilmName",
            version: "1.0",
            season,
            episode,
        };
        self.search("FindSeries", request).await
    }

    async fn download(
        &self,
        _session: &Session,
        _reference: Option<&str>,
        subtitle_id: &str,
    ) -> SubarrResult<Vec<u8>> {
        info!(target: "subarr::screwzira", "Downloading: {subtitle_id}");
        let resp = self
            .client
            .post(self.url("Download"))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "*/*")
            .json(&Envelope {
                request: DownloadRequest { subtitle_id },
            })
            .send()
            .await?;
        let bytes = ensure_success(resp, "Screwzira download").await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
