use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{Category, MovieId},
    error::FetchResult,
    protocol::{Credits, MovieDetails, MoviePage},
};
use tokio::sync::{broadcast, Mutex};
use tracing::info;

pub mod detail_loader;
pub mod list_controller;
pub mod selector;
pub mod transport;
pub mod types;

pub use detail_loader::{DetailLoader, DetailSnapshot, DetailView};
pub use list_controller::{ListController, ListIntent, ListSnapshot};

use list_controller::ListStep;
pub use selector::Selector;
pub use transport::{ApiConfig, TmdbClient};
pub use types::{DetailRecord, Director, ListQuery, ListRequest, ListResult, Selection};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Upstream movie metadata operations the controllers depend on.
#[async_trait]
pub trait MovieApi: Send + Sync {
    async fn list_by_category(&self, category: Category, page: u32) -> FetchResult<MoviePage>;
    async fn search_by_text(&self, text: &str, page: u32) -> FetchResult<MoviePage>;
    async fn get_detail(&self, id: MovieId) -> FetchResult<MovieDetails>;
    async fn get_credits(&self, id: MovieId) -> FetchResult<Credits>;
}

#[derive(Debug, Clone)]
pub enum ExplorerEvent {
    ListChanged(ListSnapshot),
    DetailChanged(DetailSnapshot),
}

/// Browsing session: forwards selector changes to the list controller and
/// publishes every view transition to subscribers.
pub struct Explorer {
    selector: Mutex<Selector>,
    list: ListController,
    detail: DetailLoader,
    events: broadcast::Sender<ExplorerEvent>,
}

impl Explorer {
    pub fn new(api: Arc<dyn MovieApi>, category: Category) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let selector = Selector::new(category);
        let list = ListController::new(api.clone(), &selector.selection(), events.clone());
        let detail = DetailLoader::new(api, events.clone());
        Self {
            selector: Mutex::new(selector),
            list,
            detail,
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ExplorerEvent> {
        self.events.subscribe()
    }

    pub async fn selection(&self) -> Selection {
        self.selector.lock().await.selection()
    }

    /// Initial fetch for the current selection.
    pub async fn open(&self) -> ListSnapshot {
        let selection = self.selection().await;
        info!(category = %selection.category, "opening movie list");
        self.list.load().await
    }

    pub async fn select_category(&self, category: Category) -> ListSnapshot {
        self.update_selection(|selector| selector.select_category(category))
            .await
    }

    pub async fn set_search_text(&self, text: &str) -> ListSnapshot {
        self.update_selection(|selector| selector.set_search_text(text))
            .await
    }

    pub async fn go_home(&self) -> ListSnapshot {
        self.update_selection(Selector::reset).await
    }

    /// Initial fetch for a search; blank text opens the category list instead.
    pub async fn open_search(&self, text: &str) -> ListSnapshot {
        let step = {
            let mut selector = self.selector.lock().await;
            let selection = selector.set_search_text(text);
            match self.list.begin(ListIntent::Select(selection)).await {
                ListStep::Unchanged(_) => self.list.begin(ListIntent::Refresh).await,
                issued => issued,
            }
        };
        self.list.complete(step).await
    }

    /// Applies a selector mutation and takes the list's reducer step under the
    /// selector lock, so the list sees selections in the order they were made.
    async fn update_selection<F>(&self, update: F) -> ListSnapshot
    where
        F: FnOnce(&mut Selector) -> Selection,
    {
        let step = {
            let mut selector = self.selector.lock().await;
            let selection = update(&mut selector);
            self.list.begin(ListIntent::Select(selection)).await
        };
        self.list.complete(step).await
    }

    pub async fn go_to_page(&self, page: u32) -> ListSnapshot {
        self.list.go_to_page(page).await
    }

    pub async fn next_page(&self) -> ListSnapshot {
        self.list.next_page().await
    }

    pub async fn previous_page(&self) -> ListSnapshot {
        self.list.previous_page().await
    }

    pub async fn refresh(&self) -> ListSnapshot {
        self.list.load().await
    }

    pub async fn load_detail(&self, id: MovieId) -> DetailSnapshot {
        self.detail.load_detail(id).await
    }

    pub async fn close_detail(&self) -> DetailSnapshot {
        self.detail.close().await
    }

    pub async fn list_snapshot(&self) -> ListSnapshot {
        self.list.snapshot().await
    }

    pub async fn detail_snapshot(&self) -> DetailSnapshot {
        self.detail.snapshot().await
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
