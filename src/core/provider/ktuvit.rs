use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT, COOKIE, REFERER, SET_COOKIE, USER_AGENT as USER_AGENT_HEADER};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::cache::ShowIdCache;
use crate::core::matching::MatchCandidate;
use crate::utils::{Error, SubarrResult};

use super::{ensure_success, SearchResults, Session, SubtitleCatalog, USER_AGENT};

const DEFAULT_BASE_URL: &str = "https://www.ktuvit.me";
pub const SHOW_ID_CACHE_ID: &str = "tv-show-ids";

const SEARCH_TYPE_MOVIE: &str = "0";
const SEARCH_TYPE_SERIES: &str = "1";

static ROW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<tr>(.+?)</tr>").unwrap());
static SUBTITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div style="float.+?>\s+(.+?)<br />.+?data-subtitle-id="(.+?)""#).unwrap()
});

/// ASP.NET services wrap their JSON payload in a string under `d`.
#[derive(Debug, Deserialize)]
struct Wrapped {
    d: String,
}

#[derive(Debug, Deserialize)]
struct FilmsResponse {
    #[serde(rename = "Films", default)]
    films: Option<Vec<Film>>,
}

#[derive(Debug, Deserialize)]
struct Film {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "EngName", default)]
    eng_name: Option<String>,
    #[serde(rename = "ReleaseDate", default)]
    release_date: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DownloadIdentifierResponse {
    #[serde(rename = "DownloadIdentifier", default)]
    download_identifier: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Id of the film (or series) whose English name is `name`, released in `year` if given.
pub fn parse_film_id(
    query_body: &str,
    name: &str,
    year: Option<u16>,
) -> Result<Option<String>, Error> {
    let parsed: FilmsResponse = serde_json::from_str(query_body)?;
    let name = name.to_lowercase();
    Ok(parsed.films.unwrap_or_default().into_iter().find_map(|film| {
        let same_name =
            film.eng_name.as_deref().map(str::to_lowercase).as_deref() == Some(name.as_str());
        let same_year = year.map_or(true, |y| film.release_date == Some(i64::from(y)));
        (same_name && same_year).then_some(film.id)
    }))
}

/// Subtitle rows of a movie page or an episode subtitle list.
pub fn parse_subtitles(page_body: &str) -> Vec<MatchCandidate> {
    ROW_RE
        .captures_iter(page_body)
        .filter_map(|row| {
            let caps = SUBTITLE_RE.captures(row.get(1)?.as_str())?;
            Some(MatchCandidate {
                name: caps.get(1)?.as_str().trim().to_string(),
                id: caps.get(2)?.as_str().to_string(),
            })
        })
        .collect()
}

pub fn parse_download_identifier(query_body: &str) -> Result<Option<String>, Error> {
    let parsed: DownloadIdentifierResponse = serde_json::from_str(query_body)?;
    Ok(parsed.download_identifier.filter(|id| !id.is_empty()))
}

/// Body of `SearchPage_search`. The year is numeric; series searches send it empty.
fn search_payload(name: &str, year: Option<u16>, search_type: &str) -> Value {
    let year = match year {
        Some(y) => json!(y),
        None => json!(""),
    };
    json!({
        "request": {
            "FilmName": name,
            "Actors": [],
            "Studios": null,
            "Directors": [],
            "Genres": [],
            "Countries": [],
            "Languages": [],
            "Year": year,
            "Rating": [],
            "Page": 1,
            "SearchType": search_type,
            "WithSubsOnly": false
        }
    })
}

/// `name=value` part of every `Set-Cookie` header.
fn session_cookies(headers: &reqwest::header::HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(|pair| pair.trim().to_string())
        .filter(|pair| !pair.is_empty())
        .collect()
}

pub struct KtuvitCatalog {
    base_url: String,
    email: String,
    password: String,
    client: reqwest::Client,
    show_ids: Mutex<ShowIdCache>,
}

impl KtuvitCatalog {
    pub fn new(
        base_url: Option<String>,
        email: String,
        password: String,
        show_ids: ShowIdCache,
    ) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            email,
            password,
            client: reqwest::Client::new(),
            show_ids: Mutex::new(show_ids),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn movie_page(&self, film_id: &str) -> String {
        self.url(&format!("MovieInfo.aspx?ID={film_id}"))
    }

    fn get(&self, session: &Session, url: String) -> reqwest::RequestBuilder {
        let req = self.client.get(url).header(USER_AGENT_HEADER, USER_AGENT);
        match session.cookie_header() {
            Some(cookie) => req.header(COOKIE, cookie),
            None => req,
        }
    }

    fn post(&self, session: &Session, url: String) -> reqwest::RequestBuilder {
        let req = self.client.post(url).header(USER_AGENT_HEADER, USER_AGENT);
        match session.cookie_header() {
            Some(cookie) => req.header(COOKIE, cookie),
            None => req,
        }
    }

    async fn find_film_id(
        &self,
        session: &Session,
        name: &str,
        year: Option<u16>,
        search_type: &str,
    ) -> SubarrResult<Option<String>> {
        let payload = search_payload(name, year, search_type);
        debug!(target: "subarr::ktuvit", name = %name, year = ?year, "Searching film");

        let resp = self
            .post(session, self.url("Services/ContentProvider.svc/SearchPage_search"))
            .json(&payload)
            .send()
            .await?;
        let wrapped: Wrapped = ensure_success(resp, "Ktuvit search").await?.json().await?;
        parse_film_id(&wrapped.d, name, year)
    }

    async fn fetch_subtitles(
        &self,
        session: &Session,
        url: String,
    ) -> SubarrResult<Vec<MatchCandidate>> {
        let resp = self.get(session, url).send().await?;
        let page = ensure_success(resp, "Ktuvit subtitles page").await?.text().await?;
        Ok(parse_subtitles(&page))
    }

    async fn request_download_identifier(
        &self,
        session: &Session,
        film_id: &str,
        subtitle_id: &str,
    ) -> SubarrResult<String> {
        info!(target: "subarr::ktuvit", "Downloading: {subtitle_id}");
        let payload = json!({
            "request": {
                "FilmID": film_id,
                "SubtitleID": subtitle_id,
                "FontSize": 0,
                "FontColor": "",
                "PredefinedLayout": -1
            }
        });
        let resp = self
            .post(session, self.url("Services/ContentProvider.svc/RequestSubtitleDownload"))
            .header(ACCEPT, "*/*")
            .header(REFERER, self.movie_page(film_id))
            .json(&payload)
            .send()
            .await?;
        let wrapped: Wrapped = ensure_success(resp, "Ktuvit download request").await?.json().await?;
        parse_download_identifier(&wrapped.d)?.ok_or_else(|| {
            Error::Other(format!("no download identifier for subtitle {subtitle_id}"))
        })
    }
}

#[async_trait]
impl SubtitleCatalog for KtuvitCatalog {
    fn name(&self) -> &str {
        "ktuvit"
    }

    async fn login(&self) -> SubarrResult<Session> {
        let resp = self
            .client
            .post(self.url("Services/MembershipService.svc/Login"))
            .header(USER_AGENT_HEADER, USER_AGENT)
            .json(&json!({
                "request": LoginRequest {
                    email: &self.email,
                    password: &self.password,
                }
            }))
            .send()
            .await?;
        let resp = ensure_success(resp, "Ktuvit login").await?;

        let cookies = session_cookies(resp.headers());
        if cookies.is_empty() {
            return Err(Error::Other("Ktuvit login returned no session cookie".to_string()));
        }
        debug!(target: "subarr::ktuvit", cookies = cookies.len(), "Logged in");
        Ok(Session::with_cookies(cookies))
    }

    async fn search_movie(
        &self,
        session: &Session,
        title: &str,
        year: u16,
    ) -> SubarrResult<SearchResults> {
        let film_id = self
            .find_film_id(session, title, Some(year), SEARCH_TYPE_MOVIE)
            .await?;
        let Some(film_id) = film_id else {
            info!(target: "subarr::ktuvit", "No film id for \"{title}\" ({year})");
            return Ok(SearchResults::empty());
        };

        let candidates = self.fetch_subtitles(session, self.movie_page(&film_id)).await?;
        Ok(SearchResults {
            reference: Some(film_id),
            candidates,
        })
    }

    async fn search_episode(
        &self,
        session: &Session,
        series: &str,
        season: u32,
        episode: u32,
    ) -> SubarrResult<SearchResults> {
        let series_id = {
            let mut cache = self.show_ids.lock().await;
            cache
                .get_or_fetch(series, || {
                    self.find_film_id(session, series, None, SEARCH_TYPE_SERIES)
                })
                .await
        };
        let Some(series_id) = series_id else {
            info!(target: "subarr::ktuvit", "No series id for \"{series}\"");
            return Ok(SearchResults::empty());
        };

        let url = self.url(&format!(
            "Services/GetModuleAjax.ashx?moduleName=SubtitlesList&SeriesID={series_id}&Season={season}&Episode={episode}"
        ));
        let candidates = self.fetch_subtitles(session, url).await?;
        Ok(SearchResults {
            reference: Some(series_id),
            candidates,
        })
    }

    async fn download(
        &self,
        session: &Session,
        reference: Option<&str>,
        subtitle_id: &str,
    ) -> SubarrResult<Vec<u8>> {
        let film_id = reference
            .ok_or_else(|| Error::Other(format!("no film id to download subtitle {subtitle_id}")))?;
        let identifier = self.request_download_identifier(session, film_id, subtitle_id).await?;

        info!(target: "subarr::ktuvit", "Downloading: {identifier}");
        let resp = self
            .get(
                session,
                self.url(&format!("Services/DownloadFile.ashx?DownloadIdentifier={identifier}")),
            )
            .header(ACCEPT, "*/*")
            .header(REFERER, self.movie_page(film_id))
            .send()
            .await?;
        let bytes = ensure_success(resp, "Ktuvit download").await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    const FILMS: &str = r#"{"Films":[
        {"ID":"AAA","EngName":"Frozen","HebName":"x","ReleaseDate":2010,"IsSeries":false},
        {"ID":"0679D248C930F4659069AC9F9FA2E8D7","EngName":"Frozen","HebName":"x","ReleaseDate":2013,"IsSeries":false},
        {"ID":"BBB","EngName":"Frozen II","HebName":"x","ReleaseDate":2019,"IsSeries":false}
    ]}"#;

    const PAGE: &str = r#"<table>
<tr>
    <td>
        <div style="float:right; max-width:230px;">
            Frozen.2013.1080p.BluRay.x264-SPARKS<br />
            <small>uploader</small>
        </div>
    </td>
    <td><a data-subtitle-id="E00664CE8F1C1D95D55CC21E85C1A031">download</a></td>
</tr>
<tr><th>header row without subtitle</th></tr>
<tr>
    <td>
        <div style="float:right;">
            Frozen.2013.720p.BluRay.x264.YIFY<br />
        </div>
    </td>
    <td><a data-subtitle-id="316C38680D0F36489DA0C742E8F18F4A">download</a></td>
</tr>
</table>"#;

    #[test]
    fn film_id_matches_name_and_year() {
        assert_eq!(
            parse_film_id(FILMS, "frozen", Some(2013)).unwrap().as_deref(),
            Some("0679D248C930F4659069AC9F9FA2E8D7")
        );
        assert_eq!(parse_film_id(FILMS, "Frozen", None).unwrap().as_deref(), Some("AAA"));
        assert_eq!(parse_film_id(FILMS, "frozen ii", Some(2019)).unwrap().as_deref(), Some("BBB"));
        assert_eq!(parse_film_id(FILMS, "frozen 2", Some(2019)).unwrap(), None);
        assert_eq!(parse_film_id(r#"{"Films":null}"#, "frozen", None).unwrap(), None);
    }

    #[test]
    fn subtitles_from_page() {
        assert_eq!(
            parse_subtitles(PAGE),
            vec![
                MatchCandidate {
                    name: "Frozen.2013.1080p.BluRay.x264-SPARKS".into(),
                    id: "E00664CE8F1C1D95D55CC21E85C1A031".into(),
                },
                MatchCandidate {
                    name: "Frozen.2013.720p.BluRay.x264.YIFY".into(),
                    id: "316C38680D0F36489DA0C742E8F18F4A".into(),
                },
            ]
        );
        assert!(parse_subtitles("<html></html>").is_empty());
    }

    #[test]
    fn download_identifier() {
        let body = r#"{"ValidIn":0,"DownloadIdentifier":"b53e6717-98ed-4827-9fae-083b5004b22a","IsSuccess":true,"ErrorMessage":""}"#;
        assert_eq!(
            parse_download_identifier(body).unwrap().as_deref(),
            Some("b53e6717-98ed-4827-9fae-083b5004b22a")
        );
        assert_eq!(parse_download_identifier(r#"{"DownloadIdentifier":""}"#).unwrap(), None);
    }

    #[test]
    fn search_request_shape() {
        let movie = search_payload("frozen", Some(2013), SEARCH_TYPE_MOVIE);
        assert_eq!(movie["request"]["FilmName"], "frozen");
        assert_eq!(movie["request"]["Year"], json!(2013));
        assert_eq!(movie["request"]["SearchType"], "0");
        assert_eq!(movie["request"]["Page"], 1);
        assert!(movie["request"]["Studios"].is_null());

        let series = search_payload("the office us", None, SEARCH_TYPE_SERIES);
        assert_eq!(series["request"]["Year"], "");
        assert_eq!(series["request"]["SearchType"], "1");
    }

    #[test]
    fn cookies_keep_name_value_only() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("Login=abc; path=/; HttpOnly"));
        headers.append(SET_COOKIE, HeaderValue::from_static("ASP.NET_SessionId=xyz; path=/"));
        assert_eq!(session_cookies(&headers), ["Login=abc", "ASP.NET_SessionId=xyz"]);
        assert!(session_cookies(&HeaderMap::new()).is_empty());
    }
}
