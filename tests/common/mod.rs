#![allow(dead_code)]
use async_trait::async_trait;
use http_client::{HttpClient, Request, Response};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use verse_ingest::{
    ArtistItem, ArtistSearchResults, IngestError, Result, SearchPage, SpotifyClient,
};

/// Scripted search client: queued responses per query, records every call.
#[derive(Default)]
pub struct ScriptedClient {
    responses: RefCell<HashMap<String, VecDeque<Result<SearchPage>>>>,
    calls: RefCell<Vec<(String, u32)>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, query: &str, page: SearchPage) -> Self {
        self.push(query, Ok(page));
        self
    }

    pub fn fail(self, query: &str, error: IngestError) -> Self {
        self.push(query, Err(error));
        self
    }

    fn push(&self, query: &str, response: Result<SearchPage>) {
        self.responses
            .borrow_mut()
            .entry(query.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl SpotifyClient for ScriptedClient {
    async fn search_artists(&self, query: &str, offset: u32) -> Result<SearchPage> {
        self.calls.borrow_mut().push((query.to_string(), offset));
        self.responses
            .borrow_mut()
            .get_mut(query)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(IngestError::Http(format!("unexpected search for '{query}'"))))
    }
}

pub fn item(id: &str, name: &str, genres: &[&str], popularity: u32) -> ArtistItem {
    ArtistItem {
        id: id.to_string(),
        name: name.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        popularity,
    }
}

pub fn page(items: Vec<ArtistItem>, offset: u32, total: u32, next: Option<&str>) -> SearchPage {
    SearchPage {
        artists: ArtistSearchResults {
            href: format!("https://api.spotify.com/v1/search?type=artist&offset={offset}"),
            limit: 50,
            items,
            next: next.map(str::to_string),
            offset,
            previous: None,
            total,
        },
    }
}

/// The single-page, two-artist response for query "a".
pub fn two_artist_page() -> SearchPage {
    page(
        vec![
            item("1", "Artist One", &["rock"], 70),
            item("2", "Artist Two", &["pop"], 60),
        ],
        0,
        2,
        None,
    )
}

/// One request seen by [`ScriptedHttp`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

#[derive(Debug, Default)]
struct ScriptedHttpState {
    responses: HashMap<String, VecDeque<CannedResponse>>,
    requests: Vec<RecordedRequest>,
}

/// Scripted HTTP transport: canned responses queued per URL path.
///
/// Clones share state, so a test can hand one clone to the client and keep
/// another to inspect the recorded requests. Unscripted paths answer 404.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHttp {
    state: Arc<Mutex<ScriptedHttpState>>,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, path: &str, status: u16, body: impl Into<String>) -> Self {
        self.reply_with_headers(path, status, &[], body)
    }

    pub fn reply_with_headers(
        self,
        path: &str,
        status: u16,
        headers: &[(&str, &str)],
        body: impl Into<String>,
    ) -> Self {
        let canned = CannedResponse {
            status,
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body: body.into(),
        };
        self.state
            .lock()
            .unwrap()
            .responses
            .entry(path.to_string())
            .or_default()
            .push_back(canned);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

#[http_client::async_trait]
impl HttpClient for ScriptedHttp {
    async fn send(&self, mut req: Request) -> std::result::Result<Response, http_client::Error> {
        let body = req.body_string().await?;
        let path = req.url().path().to_string();
        let recorded = RecordedRequest {
            method: req.method().to_string(),
            path: path.clone(),
            query: req
                .url()
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            authorization: req
                .header("Authorization")
                .map(|values| values.last().as_str().to_string()),
            body,
        };

        let canned = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(recorded);
            state
                .responses
                .get_mut(&path)
                .and_then(VecDeque::pop_front)
        };
        let canned = canned.unwrap_or_else(|| CannedResponse {
            status: 404,
            headers: vec![],
            body: format!("no response scripted for {path}"),
        });

        let mut response = Response::new(canned.status);
        for (name, value) in &canned.headers {
            response.insert_header(name.as_str(), value.as_str());
        }
        response.set_body(canned.body);
        Ok(response)
    }
}

pub const TOKEN_PATH: &str = "/api/token";
pub const SEARCH_PATH: &str = "/v1/search";

pub fn token_body(access_token: &str, expires_in: u64) -> String {
    serde_json::json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in,
    })
    .to_string()
}

/// Search response body holding `ids`, with no further page.
pub fn search_body(ids: &[&str]) -> String {
    let items: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "id": id,
                "name": format!("Artist {id}"),
                "genres": ["rock"],
                "popularity": 50,
            })
        })
        .collect();
    serde_json::json!({
        "artists": {
            "href": "https://api.spotify.com/v1/search",
            "items": items,
            "limit": 50,
            "next": null,
            "offset": 0,
            "previous": null,
            "total": ids.len(),
        }
    })
    .to_string()
}
