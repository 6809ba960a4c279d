use std::sync::Arc;

use shared::{domain::MovieId, error::FetchError};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info};

use crate::{types::DetailRecord, ExplorerEvent, MovieApi};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Idle,
    Loading,
    Loaded(DetailRecord),
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailSnapshot {
    pub requested: Option<MovieId>,
    pub view: DetailView,
}

impl DetailSnapshot {
    pub fn is_loading(&self) -> bool {
        matches!(self.view, DetailView::Loading)
    }

    pub fn record(&self) -> Option<&DetailRecord> {
        match &self.view {
            DetailView::Loaded(record) => Some(record),
            _ => None,
        }
    }
}

struct DetailState {
    requested: Option<MovieId>,
    view: DetailView,
    issued: u64,
}

impl DetailState {
    fn snapshot(&self) -> DetailSnapshot {
        DetailSnapshot {
            requested: self.requested,
            view: self.view.clone(),
        }
    }
}

/// Loads one movie's record and credits together; either failing fails the view.
pub struct DetailLoader {
    api: Arc<dyn MovieApi>,
    state: Mutex<DetailState>,
    events: broadcast::Sender<ExplorerEvent>,
}

impl DetailLoader {
    pub fn new(api: Arc<dyn MovieApi>, events: broadcast::Sender<ExplorerEvent>) -> Self {
        Self {
            api,
            state: Mutex::new(DetailState {
                requested: None,
                view: DetailView::Idle,
                issued: 0,
            }),
            events,
        }
    }

    pub async fn snapshot(&self) -> DetailSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn load_detail(&self, id: MovieId) -> DetailSnapshot {
        let ticket = {
            let mut state = self.state.lock().await;
            let settled_or_pending = matches!(state.view, DetailView::Loading | DetailView::Loaded(_));
            if state.requested == Some(id) && settled_or_pending {
                return state.snapshot();
            }
            state.issued += 1;
            state.requested = Some(id);
            state.view = DetailView::Loading;
            self.publish(state.snapshot());
            state.issued
        };

        debug!(ticket, movie_id = id.0, "issuing detail fetch");
        let outcome = futures::try_join!(self.api.get_detail(id), self.api.get_credits(id))
            .and_then(|(details, credits)| {
                if details.id != id {
                    return Err(FetchError::malformed(format!(
                        "detail payload for movie {} returned id {}",
                        id, details.id
                    )));
                }
                Ok(DetailRecord::assemble(details, credits))
            });

        let mut state = self.state.lock().await;
        if ticket != state.issued {
            debug!(ticket, latest = state.issued, "discarding superseded detail response");
            return state.snapshot();
        }
        state.view = match outcome {
            Ok(record) => {
                info!(movie_id = id.0, director = %record.director, "movie details loaded");
                DetailView::Loaded(record)
            }
            Err(err) => {
                error!(movie_id = id.0, code = ?err.code, "failed to fetch movie details: {err}");
                DetailView::NotFound
            }
        };
        let snapshot = state.snapshot();
        self.publish(snapshot.clone());
        snapshot
    }

    /// Tears the view down; a response still in flight is discarded.
    pub async fn close(&self) -> DetailSnapshot {
        let mut state = self.state.lock().await;
        state.issued += 1;
        state.requested = None;
        state.view = DetailView::Idle;
        let snapshot = state.snapshot();
        self.publish(snapshot.clone());
        snapshot
    }

    fn publish(&self, snapshot: DetailSnapshot) {
        let _ = self.events.send(ExplorerEvent::DetailChanged(snapshot));
    }
}

#[cfg(test)]
#[path = "tests/detail_loader_tests.rs"]
mod tests;
