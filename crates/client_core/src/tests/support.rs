//! Scripted in-memory `MovieApi` for controller tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use shared::{
    domain::{Category, MovieId, PersonId},
    error::{FetchError, FetchResult},
    protocol::{CastMember, Credits, CrewMember, MovieDetails, MoviePage, MovieSummary},
};
use tokio::sync::oneshot;

use crate::MovieApi;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ApiCall {
    Browse(Category, u32),
    Search(String, u32),
    Detail(MovieId),
    Credits(MovieId),
}

/// Handle on a call parked by [`FakeMovieApi::hold`].
pub(crate) struct Held {
    pub entered: oneshot::Receiver<()>,
    pub release: oneshot::Sender<()>,
}

#[derive(Default)]
pub(crate) struct FakeMovieApi {
    pages: HashMap<ApiCall, FetchResult<MoviePage>>,
    details: HashMap<MovieId, FetchResult<MovieDetails>>,
    credits: HashMap<MovieId, FetchResult<Credits>>,
    holds: Mutex<HashMap<ApiCall, (oneshot::Sender<()>, oneshot::Receiver<()>)>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl FakeMovieApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, call: ApiCall, page: MoviePage) -> Self {
        self.pages.insert(call, Ok(page));
        self
    }

    pub fn with_page_failure(mut self, call: ApiCall, err: FetchError) -> Self {
        self.pages.insert(call, Err(err));
        self
    }

    pub fn with_details(mut self, details: MovieDetails) -> Self {
        self.details.insert(details.id, Ok(details));
        self
    }

    /// Serves `details` for `id` regardless of the payload's own id.
    pub fn with_details_for(mut self, id: MovieId, details: MovieDetails) -> Self {
        self.details.insert(id, Ok(details));
        self
    }

    pub fn with_details_failure(mut self, id: MovieId, err: FetchError) -> Self {
        self.details.insert(id, Err(err));
        self
    }

    pub fn with_credits(mut self, id: MovieId, credits: Credits) -> Self {
        self.credits.insert(id, Ok(credits));
        self
    }

    pub fn with_credits_failure(mut self, id: MovieId, err: FetchError) -> Self {
        self.credits.insert(id, Err(err));
        self
    }

    /// Parks the next `call` until the returned handle releases it.
    pub fn hold(&self, call: ApiCall) -> Held {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.holds
            .lock()
            .expect("holds lock")
            .insert(call, (entered_tx, release_rx));
        Held {
            entered: entered_rx,
            release: release_tx,
        }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    async fn record(&self, call: &ApiCall) {
        self.calls.lock().expect("calls lock").push(call.clone());
        let hold = self.holds.lock().expect("holds lock").remove(call);
        if let Some((entered, release)) = hold {
            let _ = entered.send(());
            let _ = release.await;
        }
    }

    fn page_for(&self, call: &ApiCall) -> FetchResult<MoviePage> {
        self.pages
            .get(call)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::upstream(404, format!("no page for {call:?}"))))
    }
}

#[async_trait]
impl MovieApi for FakeMovieApi {
    async fn list_by_category(&self, category: Category, page: u32) -> FetchResult<MoviePage> {
        let call = ApiCall::Browse(category, page);
        self.record(&call).await;
        self.page_for(&call)
    }

    async fn search_by_text(&self, text: &str, page: u32) -> FetchResult<MoviePage> {
        let call = ApiCall::Search(text.to_string(), page);
        self.record(&call).await;
        self.page_for(&call)
    }

    async fn get_detail(&self, id: MovieId) -> FetchResult<MovieDetails> {
        self.record(&ApiCall::Detail(id)).await;
        self.details
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::upstream(404, "The resource you requested could not be found.")))
    }

    async fn get_credits(&self, id: MovieId) -> FetchResult<Credits> {
        self.record(&ApiCall::Credits(id)).await;
        self.credits
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::upstream(404, "The resource you requested could not be found.")))
    }
}

pub(crate) fn summary(id: i64, title: &str) -> MovieSummary {
    MovieSummary {
        id: MovieId(id),
        title: title.to_string(),
        overview: format!("Overview of {title}"),
        release_date: Some("2025-01-01".to_string()),
        poster_path: Some(format!("/poster{id}.jpg")),
    }
}

pub(crate) fn movie_page(page: u32, total_pages: u32, items: Vec<MovieSummary>) -> MoviePage {
    MoviePage {
        page,
        total_results: items.len() as u32,
        results: items,
        total_pages,
    }
}

pub(crate) fn movie_details(id: i64, title: &str) -> MovieDetails {
    MovieDetails {
        id: MovieId(id),
        title: title.to_string(),
        overview: format!("Overview of {title}"),
        release_date: Some("1999-03-31".to_string()),
        poster_path: Some(format!("/poster{id}.jpg")),
        tagline: None,
        runtime: Some(136),
        genres: Vec::new(),
    }
}

pub(crate) fn credits(cast_len: i64, crew: &[(&str, &str)]) -> Credits {
    Credits {
        cast: (1..=cast_len)
            .map(|n| CastMember {
                id: PersonId(n),
                name: format!("Actor {n}"),
                character: format!("Character {n}"),
            })
            .collect(),
        crew: crew
            .iter()
            .enumerate()
            .map(|(n, (name, job))| CrewMember {
                id: PersonId(100 + n as i64),
                name: name.to_string(),
                job: job.to_string(),
            })
            .collect(),
    }
}
