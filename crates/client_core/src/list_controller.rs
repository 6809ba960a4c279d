//! Paginated list view state synchronized to the upstream list/search endpoints.
//!
//! Every interaction goes through [`next_query`], a pure reducer that yields the
//! next query (or nothing, when the interaction does not change it). Each issued
//! fetch takes a ticket; only the response carrying the latest ticket is applied.

use std::sync::Arc;

use shared::{
    error::FetchResult,
    protocol::{MoviePage, MovieSummary},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    types::{ListQuery, ListRequest, ListResult, Selection, MAX_UPSTREAM_PAGE},
    ExplorerEvent, MovieApi,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListIntent {
    /// Re-issue the current query (mount or explicit refresh).
    Refresh,
    Select(Selection),
    GoToPage(u32),
}

/// Next query for `intent`, or `None` when the query would not change.
pub fn next_query(current: &ListQuery, total_pages: u32, intent: ListIntent) -> Option<ListQuery> {
    match intent {
        ListIntent::Refresh => Some(current.clone()),
        ListIntent::Select(selection) => {
            if current.same_selection(&selection) {
                None
            } else {
                Some(ListQuery::first_page(&selection))
            }
        }
        ListIntent::GoToPage(page) => {
            if page < 1 || page > total_pages || page == current.page {
                None
            } else {
                Some(ListQuery {
                    page,
                    ..current.clone()
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    pub query: ListQuery,
    pub result: ListResult,
    pub loading: bool,
    pub failed: bool,
}

impl ListSnapshot {
    /// Items to render; none while a fetch is in flight.
    pub fn visible_items(&self) -> &[MovieSummary] {
        if self.loading {
            &[]
        } else {
            &self.result.items
        }
    }

    pub fn heading(&self) -> String {
        if self.query.is_search() {
            format!("Search results for \"{}\"", self.query.search_text.trim())
        } else {
            self.query.category.label().to_string()
        }
    }

    pub fn page_label(&self) -> String {
        format!(
            "Page {} of {}",
            self.result.current_page, self.result.total_pages
        )
    }

    pub fn shows_pagination(&self) -> bool {
        !self.loading && self.result.total_pages > 1
    }

    pub fn has_previous(&self) -> bool {
        self.result.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.result.current_page < self.result.total_pages
    }

    pub fn is_empty_search(&self) -> bool {
        !self.loading && !self.failed && self.query.is_search() && self.result.items.is_empty()
    }
}

/// Outcome of the reducer step of a list interaction.
pub(crate) enum ListStep {
    Unchanged(ListSnapshot),
    Issued { ticket: u64, query: ListQuery },
}

struct ListState {
    query: ListQuery,
    result: ListResult,
    loading: bool,
    failed: bool,
    issued: u64,
}

impl ListState {
    fn issue(&mut self, query: ListQuery) -> u64 {
        self.issued += 1;
        self.query = query;
        self.loading = true;
        self.issued
    }

    fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            query: self.query.clone(),
            result: self.result.clone(),
            loading: self.loading,
            failed: self.failed,
        }
    }
}

pub struct ListController {
    api: Arc<dyn MovieApi>,
    state: Mutex<ListState>,
    events: broadcast::Sender<ExplorerEvent>,
}

impl ListController {
    pub fn new(
        api: Arc<dyn MovieApi>,
        selection: &Selection,
        events: broadcast::Sender<ExplorerEvent>,
    ) -> Self {
        Self {
            api,
            state: Mutex::new(ListState {
                query: ListQuery::first_page(selection),
                result: ListResult::default(),
                loading: false,
                failed: false,
                issued: 0,
            }),
            events,
        }
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn load(&self) -> ListSnapshot {
        self.dispatch(ListIntent::Refresh).await
    }

    pub async fn apply_selection(&self, selection: Selection) -> ListSnapshot {
        self.dispatch(ListIntent::Select(selection)).await
    }

    /// No-op unless `1 <= page <= total_pages`.
    pub async fn go_to_page(&self, page: u32) -> ListSnapshot {
        self.dispatch(ListIntent::GoToPage(page)).await
    }

    pub async fn next_page(&self) -> ListSnapshot {
        let current = self.state.lock().await.query.page;
        self.go_to_page(current.saturating_add(1)).await
    }

    pub async fn previous_page(&self) -> ListSnapshot {
        let current = self.state.lock().await.query.page;
        self.go_to_page(current.saturating_sub(1)).await
    }

    pub async fn dispatch(&self, intent: ListIntent) -> ListSnapshot {
        let step = self.begin(intent).await;
        self.complete(step).await
    }

    /// Reducer step: records the next query under the state lock and takes a
    /// ticket for it. Callers that must order this step against other state
    /// (the selector) hold their own lock across it.
    pub(crate) async fn begin(&self, intent: ListIntent) -> ListStep {
        let mut state = self.state.lock().await;
        let Some(query) = next_query(&state.query, state.result.total_pages, intent) else {
            return ListStep::Unchanged(state.snapshot());
        };
        if !state.query.same_selection(&query.selection()) {
            // The page count belonged to the previous selection.
            state.result.current_page = 1;
            state.result.total_pages = 1;
        }
        let ticket = state.issue(query.clone());
        self.publish(state.snapshot());
        ListStep::Issued { ticket, query }
    }

    /// Runs the fetch taken by [`Self::begin`] and applies it if still latest.
    pub(crate) async fn complete(&self, step: ListStep) -> ListSnapshot {
        let (mut ticket, mut query) = match step {
            ListStep::Unchanged(snapshot) => return snapshot,
            ListStep::Issued { ticket, query } => (ticket, query),
        };

        loop {
            let request = query.resolve();
            debug!(ticket, ?request, "issuing list fetch");
            let outcome = self.fetch(&request).await;

            let mut state = self.state.lock().await;
            if ticket != state.issued {
                debug!(ticket, latest = state.issued, "discarding superseded list response");
                return state.snapshot();
            }
            match outcome {
                Ok(page) => {
                    let total_pages = page.total_pages.min(MAX_UPSTREAM_PAGE);
                    if total_pages >= 1 && query.page > total_pages {
                        info!(
                            ticket,
                            page = query.page,
                            total_pages,
                            "requested page is past the end, fetching last page"
                        );
                        query = ListQuery {
                            page: total_pages,
                            ..query
                        };
                        state.result.total_pages = total_pages;
                        state.result.current_page = state.result.current_page.min(total_pages);
                        ticket = state.issue(query.clone());
                        self.publish(state.snapshot());
                        continue;
                    }
                    info!(
                        ticket,
                        page = query.page,
                        total_pages,
                        items = page.results.len(),
                        "list page loaded"
                    );
                    state.result = ListResult {
                        items: page.results,
                        current_page: query.page,
                        total_pages,
                    };
                    state.failed = false;
                }
                Err(err) => {
                    warn!(ticket, ?request, code = ?err.code, "failed to fetch movies: {err}");
                    state.failed = true;
                }
            }
            state.loading = false;
            let settled = state.snapshot();
            self.publish(settled.clone());
            return settled;
        }
    }

    async fn fetch(&self, request: &ListRequest) -> FetchResult<MoviePage> {
        match request {
            ListRequest::Browse { category, page } => {
                self.api.list_by_category(*category, *page).await
            }
            ListRequest::Search { text, page } => self.api.search_by_text(text, *page).await,
        }
    }

    fn publish(&self, snapshot: ListSnapshot) {
        let _ = self.events.send(ExplorerEvent::ListChanged(snapshot));
    }
}

#[cfg(test)]
#[path = "tests/list_controller_tests.rs"]
mod tests;
