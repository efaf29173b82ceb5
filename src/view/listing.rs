//! Listing view state and incremental "load more"

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ViewError;
use crate::cms::{ApiResponse, CmsError, ContentSource, Predicate, QueryOptions};
use crate::config::PrismicConfig;
use crate::content::{Post, Projector};

/// One page of the listing: posts so far plus the cursor to the next page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPagination {
    pub results: Vec<Post>,
    /// `None` once the last page has been merged
    pub next_page: Option<String>,
}

impl PostPagination {
    /// Project a search response into a pagination
    pub fn from_response(
        response: &ApiResponse,
        projector: &Projector,
    ) -> Result<Self, ViewError> {
        let results = response
            .results
            .iter()
            .map(|doc| projector.project_post(doc))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            results,
            next_page: response.next_page.clone(),
        })
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Append posts not already listed and take over the new cursor
    fn merge(&mut self, posts: Vec<Post>, next_page: Option<String>) -> usize {
        let mut seen: HashSet<String> = self.results.iter().map(|p| p.uid.clone()).collect();
        let before = self.results.len();

        for post in posts {
            if seen.insert(post.uid.clone()) {
                self.results.push(post);
            } else {
                tracing::debug!("Dropping duplicate post {}", post.uid);
            }
        }

        self.next_page = next_page;
        self.results.len() - before
    }
}

/// Progress of the "load more" fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    InFlight,
    /// The last fetch failed; the message is kept for the inline notice
    Failed(String),
}

/// Outcome of a completed "load more"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// This many new posts were appended
    Appended(usize),
    /// The fetched page was empty; the listing is now complete
    Exhausted,
    /// Nothing was fetched: no cursor, or a fetch was already running
    Skipped,
}

/// Permission to fetch the next page, handed out by [`ListingView::begin_load`]
#[derive(Debug)]
pub struct LoadTicket {
    url: String,
}

impl LoadTicket {
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// The listing page: posts merged so far and the "load more" control
#[derive(Debug, Clone)]
pub struct ListingView {
    pagination: PostPagination,
    fetch: FetchState,
    projector: Projector,
}

impl ListingView {
    pub fn new(pagination: PostPagination, projector: Projector) -> Self {
        Self {
            pagination,
            fetch: FetchState::Idle,
            projector,
        }
    }

    /// Build the first page from a type query
    pub async fn initial<S>(
        source: &S,
        config: &PrismicConfig,
        projector: Projector,
    ) -> Result<Self, ViewError>
    where
        S: ContentSource + ?Sized,
    {
        let predicates = [Predicate::at("document.type", &config.document_type)];
        let mut options = QueryOptions::listing(&config.fetch, config.page_size);
        options.orderings = config.orderings.clone();

        let response = source.query(&predicates, &options).await?;
        let pagination = PostPagination::from_response(&response, &projector)?;
        tracing::debug!(
            "Listing starts with {} posts (more: {})",
            pagination.results.len(),
            pagination.has_more()
        );

        Ok(Self::new(pagination, projector))
    }

    pub fn pagination(&self) -> &PostPagination {
        &self.pagination
    }

    pub fn posts(&self) -> &[Post] {
        &self.pagination.results
    }

    pub fn next_page(&self) -> Option<&str> {
        self.pagination.next_page.as_deref()
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    /// Whether the "load more" control is shown at all
    pub fn show_load_more(&self) -> bool {
        self.pagination.has_more()
    }

    /// Whether activating the control would start a fetch
    pub fn can_load_more(&self) -> bool {
        self.show_load_more() && self.fetch != FetchState::InFlight
    }

    /// Message of the last failed fetch
    pub fn notice(&self) -> Option<&str> {
        match &self.fetch {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Start a fetch of the next page; `None` if there is nothing to start
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if !self.can_load_more() {
            return None;
        }
        let url = self.pagination.next_page.clone()?;
        self.fetch = FetchState::InFlight;
        Some(LoadTicket { url })
    }

    /// Merge the result of the fetch started with `ticket`
    ///
    /// On failure the posts and cursor stay as they were and the error is
    /// kept as a notice.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<ApiResponse, CmsError>,
    ) -> Result<LoadOutcome, ViewError> {
        let projected = result
            .map_err(ViewError::from)
            .and_then(|response| PostPagination::from_response(&response, &self.projector));

        let page = match projected {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Loading {} failed: {}", ticket.url, e);
                self.fetch = FetchState::Failed(e.to_string());
                return Err(e);
            }
        };

        self.fetch = FetchState::Idle;

        if page.results.is_empty() {
            tracing::debug!("{} returned no posts, listing complete", ticket.url);
            self.pagination.next_page = None;
            return Ok(LoadOutcome::Exhausted);
        }

        let appended = self.pagination.merge(page.results, page.next_page);
        Ok(LoadOutcome::Appended(appended))
    }

    /// Fetch the page behind the cursor and merge it
    pub async fn load_more<S>(&mut self, source: &S) -> Result<LoadOutcome, ViewError>
    where
        S: ContentSource + ?Sized,
    {
        let Some(ticket) = self.begin_load() else {
            return Ok(LoadOutcome::Skipped);
        };
        let result = source.fetch_page(ticket.url()).await;
        self.complete_load(ticket, result)
    }
}
