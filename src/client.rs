//! OpenReview API client: login, groups, and paginated note listing.
//! Pages after the first are fetched concurrently, bounded by a semaphore.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{ClientConfig, Credentials};
use crate::error::{Error, Result};

/// Which submissions of a venue to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    All,
    Accepted,
    Withdrawn,
    DeskRejected,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::All,
        Status::Accepted,
        Status::Withdrawn,
        Status::DeskRejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::All => "all",
            Status::Accepted => "accepted",
            Status::Withdrawn => "withdrawn",
            Status::DeskRejected => "desk-rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidStatus {
                value: s.to_string(),
                allowed: Status::ALL.map(|status| status.as_str()).join(", "),
            })
    }
}

/// A `{"value": ...}` wrapper as used in note and group content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentValue {
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub content: HashMap<String, ContentValue>,
}

impl Note {
    pub fn text(&self, key: &str) -> Option<&str> {
        self.content.get(key)?.value.as_str()
    }

    pub fn strings(&self, key: &str) -> Vec<String> {
        self.content
            .get(key)
            .and_then(|c| c.value.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub content: HashMap<String, ContentValue>,
}

#[derive(Debug, Deserialize)]
struct GroupsPage {
    #[serde(default)]
    groups: Vec<Group>,
}

#[derive(Debug, Deserialize)]
struct NotesPage {
    #[serde(default)]
    notes: Vec<Note>,
    #[serde(default)]
    count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// How notes are selected in a listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteFilter {
    Invitation(String),
    VenueId(String),
}

impl NoteFilter {
    fn query_pair(&self) -> (&'static str, &str) {
        match self {
            NoteFilter::Invitation(id) => ("invitation", id.as_str()),
            NoteFilter::VenueId(id) => ("content.venueid", id.as_str()),
        }
    }
}

/// Resolve the id that selects `status` submissions of a venue from the
/// venue group's content.
pub fn query_id(venue_id: &str, status: Status, group: &Group) -> Result<String> {
    let key = match status {
        Status::Accepted => return Ok(venue_id.to_string()),
        Status::All => "submission_name",
        Status::Withdrawn => "withdrawn_venue_id",
        Status::DeskRejected => "desk_rejected_venue_id",
    };
    group
        .content
        .get(key)
        .and_then(|c| c.value.as_str())
        .map(String::from)
        .ok_or_else(|| Error::MissingField {
            field: key.to_string(),
            context: format!("group {}", group.id),
        })
}

#[derive(Debug, Clone)]
pub struct OpenReviewClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    page_size: usize,
    max_concurrent: usize,
}

impl OpenReviewClient {
    /// Build a client, logging in first when credentials are configured.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("invalid base URL {}", config.base_url)));
        }
        let mut client = Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
            page_size: config.page_size.max(1),
            max_concurrent: config.max_concurrent.max(1),
        };
        if let Some(credentials) = &config.credentials {
            client.token = Some(client.login(credentials).await?);
        }
        Ok(client)
    }

    async fn login(&self, credentials: &Credentials) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint("login"))
            .json(&serde_json::json!({
                "id": credentials.username,
                "password": credentials.password,
            }))
            .send()
            .await?;
        let status = response.status();
        if status.is_client_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("{status}: {message}")));
        }
        let body: LoginResponse = check(response).await?.json().await?;
        tracing::info!(username = %credentials.username, "logged in");
        Ok(body.token)
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        // `connect` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let mut request = self.http.get(self.endpoint(path)).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn get_group(&self, id: &str) -> Result<Group> {
        let page: GroupsPage = self.get_json("groups", &[("id", id)]).await?;
        page.groups
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("group {id}")))
    }

    /// Ids of all venues listed on the platform.
    pub async fn venues(&self) -> Result<Vec<String>> {
        Ok(self.get_group("venues").await?.members)
    }

    async fn notes_page(&self, filter: &NoteFilter, offset: usize) -> Result<NotesPage> {
        let (key, value) = filter.query_pair();
        let offset = offset.to_string();
        let limit = self.page_size.to_string();
        tracing::debug!(key, value, %offset, "fetching notes page");
        self.get_json(
            "notes",
            &[(key, value), ("offset", offset.as_str()), ("limit", limit.as_str())],
        )
        .await
    }

    /// Every note matching `filter`, in API order.
    pub async fn get_all_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let first = self.notes_page(filter, 0).await?;
        let Some(total) = first.count else {
            return self.get_remaining_sequential(filter, first.notes).await;
        };

        let sem = Arc::new(tokio::sync::Semaphore::new(self.max_concurrent));
        let mut join_set = tokio::task::JoinSet::new();
        for offset in (self.page_size..total).step_by(self.page_size) {
            let client = self.clone();
            let filter = filter.clone();
            let sem = sem.clone();
            join_set.spawn(async move {
                let _permit = sem.acquire_owned().await.map_err(|e| Error::Task(e.to_string()))?;
                let page = client.notes_page(&filter, offset).await?;
                Ok::<_, Error>((offset, page.notes))
            });
        }

        let mut pages = vec![(0, first.notes)];
        while let Some(joined) = join_set.join_next().await {
            pages.push(joined.map_err(|e| Error::Task(e.to_string()))??);
        }
        pages.sort_by_key(|(offset, _)| *offset);
        let notes: Vec<Note> = pages.into_iter().flat_map(|(_, notes)| notes).collect();
        tracing::info!(total, fetched = notes.len(), "fetched notes");
        Ok(notes)
    }

    async fn get_remaining_sequential(
        &self,
        filter: &NoteFilter,
        mut notes: Vec<Note>,
    ) -> Result<Vec<Note>> {
        let mut last_len = notes.len();
        while last_len == self.page_size {
            let page = self.notes_page(filter, notes.len()).await?;
            last_len = page.notes.len();
            notes.extend(page.notes);
        }
        tracing::info!(fetched = notes.len(), "fetched notes");
        Ok(notes)
    }

    /// All submissions of `venue_id` with the given status.
    pub async fn get_papers(&self, venue_id: &str, status: Status) -> Result<Vec<Note>> {
        let filter = match status {
            Status::Accepted => NoteFilter::VenueId(venue_id.to_string()),
            Status::All => {
                let group = self.get_group(venue_id).await?;
                let submission = query_id(venue_id, status, &group)?;
                NoteFilter::Invitation(format!("{venue_id}/-/{submission}"))
            }
            Status::Withdrawn | Status::DeskRejected => {
                let group = self.get_group(venue_id).await?;
                NoteFilter::VenueId(query_id(venue_id, status, &group)?)
            }
        };
        tracing::info!(venue_id, %status, ?filter, "listing submissions");
        self.get_all_notes(&filter).await
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

/// Fetch submissions of a venue (blocking).
pub fn fetch_papers(config: &ClientConfig, venue_id: &str, status: Status) -> Result<Vec<Note>> {
    let rt = runtime()?;
    rt.block_on(async {
        let client = OpenReviewClient::connect(config).await?;
        client.get_papers(venue_id, status).await
    })
}

/// List venue ids (blocking).
pub fn fetch_venues(config: &ClientConfig) -> Result<Vec<String>> {
    let rt = runtime()?;
    rt.block_on(async { OpenReviewClient::connect(config).await?.venues().await })
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| Error::Task(e.to_string()))
}
