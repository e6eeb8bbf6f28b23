//! Search session state.
//!
//! The session owns everything a result view depends on: the search term,
//! the filter state, the requested page, and the latest result page. Every
//! fetch is stamped with a generation number, and only the outcome of the
//! most recently issued fetch is applied.

use crate::api::{Catalog, CatalogError};
use crate::pagination::PageControls;
use crate::query::{FilterPatch, FilterState, SearchQuery};
use shared::ResultPage;
use tracing::{debug, info, warn};

/// Handle for one issued fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: SearchQuery,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }
}

#[derive(Debug)]
pub struct SearchSession {
    term: String,
    filters: FilterState,
    page: u32,
    results: ResultPage,
    loading: bool,
    /// Generation of the most recently issued fetch
    issued: u64,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(FilterState::initial())
    }
}

impl SearchSession {
    pub fn new(filters: FilterState) -> Self {
        Self {
            term: String::new(),
            filters,
            page: 1,
            results: ResultPage::empty(),
            loading: false,
            issued: 0,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn results(&self) -> &ResultPage {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replace the search term. A new term starts over at page 1.
    pub fn set_term(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term == self.term {
            return false;
        }

        debug!(term = term, "Search term changed");
        self.term = term.to_string();
        self.page = 1;
        true
    }

    /// Apply a filter interaction.
    ///
    /// Any change resets the page to 1. A reset also clears the search term.
    /// Returns whether the query changed.
    pub fn apply_filter(&mut self, patch: FilterPatch) -> bool {
        let next = self.filters.apply(patch);
        let mut changed = next != self.filters;

        if patch == FilterPatch::Reset {
            changed |= !self.term.is_empty() || self.page != 1;
            self.term.clear();
        }

        if changed {
            debug!(filters = ?next, "Filters changed");
            self.filters = next;
            self.page = 1;
        }

        changed
    }

    /// Move to `page`, clamped to the pages the last result reported.
    ///
    /// Before any pagination is known only the lower bound applies; the
    /// catalog answers out-of-range pages itself.
    pub fn go_to_page(&mut self, page: u32) -> u32 {
        self.page = match self.results.pagination {
            Some(meta) => page.clamp(1, meta.last_page.max(1)),
            None => page.max(1),
        };
        self.page
    }

    pub fn next_page(&mut self) -> u32 {
        self.go_to_page(self.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> u32 {
        self.go_to_page(self.page.saturating_sub(1))
    }

    /// The query the next fetch will issue
    pub fn query(&self) -> SearchQuery {
        SearchQuery {
            term: self.term.clone(),
            page: self.page,
            filters: self.filters,
        }
    }

    /// Issue a new fetch; earlier fetches become stale
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.loading = true;

        FetchTicket {
            generation: self.issued,
            query: self.query(),
        }
    }

    /// Apply the outcome of a fetch.
    ///
    /// Outcomes of superseded fetches are dropped. A failed fetch leaves the
    /// empty result behind. Returns whether the outcome was applied.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<ResultPage, CatalogError>,
    ) -> bool {
        if ticket.generation != self.issued {
            debug!(
                generation = ticket.generation,
                latest = self.issued,
                "Discarding stale result"
            );
            return false;
        }

        self.loading = false;
        self.results = match outcome {
            Ok(results) => {
                info!(
                    items = results.items.len(),
                    page = ticket.query.page,
                    "Results received"
                );
                results
            }
            Err(e) => {
                warn!(error = %e, query = ?ticket.query, "Fetch failed, showing no results");
                ResultPage::empty()
            }
        };

        if let Some(meta) = self.results.pagination {
            self.page = meta.current_page.max(1);
        }

        true
    }

    /// Run the current query against `catalog` and apply the outcome
    pub async fn refresh<C: Catalog>(&mut self, catalog: &mut C) -> bool {
        let ticket = self.begin_fetch();
        let query = &ticket.query;

        let outcome = if query.is_keyword_search() {
            catalog
                .search(query.kind(), &query.term, query.page, &query.filters)
                .await
        } else {
            catalog
                .list_top(query.kind(), query.page, &query.filters)
                .await
        };

        self.finish_fetch(ticket, outcome)
    }

    /// Page navigation for the current results, if they span several pages
    pub fn page_controls(&self) -> Option<PageControls> {
        PageControls::for_results(&self.results)
    }
}
