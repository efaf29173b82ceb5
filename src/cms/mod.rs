//! Content source module - talks to the headless CMS
//!
//! The rest of the crate only sees [`ContentSource`]: a page of raw
//! documents for a query, one document by uid, or the page behind an
//! opaque pagination cursor. [`PrismicClient`] is the HTTP implementation.

mod predicate;
mod prismic;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub use predicate::{to_query, Predicate};
pub use prismic::PrismicClient;

/// Largest page size the search endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised while talking to the content source
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("Document not found: {doc_type}/{uid}")]
    NotFound { doc_type: String, uid: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No master ref advertised by {0}")]
    NoMasterRef(String),
}

impl CmsError {
    /// Whether this error means the document does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CmsError::NotFound { .. })
    }
}

/// A document as returned by the content source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    /// Custom type fields, kept untyped until projection
    #[serde(default)]
    pub data: serde_json::Value,
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiResponse {
    pub page: u32,
    pub results_per_page: u32,
    pub results_size: u32,
    pub total_results_size: u32,
    pub total_pages: u32,
    /// Opaque cursor to the following page; absent on the last page
    pub next_page: Option<String>,
    pub prev_page: Option<String>,
    pub results: Vec<RawDocument>,
}

/// Options for a search query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Restrict `data` to these fields (`type.field`)
    pub fetch: Vec<String>,
    pub page_size: Option<u32>,
    pub page: Option<u32>,
    pub orderings: Option<String>,
}

impl QueryOptions {
    /// Options for a listing query
    pub fn listing(fetch: &[String], page_size: u32) -> Self {
        Self {
            fetch: fetch.to_vec(),
            page_size: Some(page_size),
            ..Default::default()
        }
    }
}

/// A headless CMS that can be queried for documents
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run a search; returns the first page and a cursor to the next one
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiResponse, CmsError>;

    /// Fetch exactly one document of `doc_type` by its uid
    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<RawDocument, CmsError>;

    /// Fetch the page behind a cursor previously returned as `next_page`
    async fn fetch_page(&self, url: &str) -> Result<ApiResponse, CmsError>;
}

/// Enumerate the uids of every document of `doc_type`, in result order
pub async fn collect_uids<S>(source: &S, doc_type: &str) -> Result<Vec<String>, CmsError>
where
    S: ContentSource + ?Sized,
{
    let predicates = [Predicate::at("document.type", doc_type)];
    let options = QueryOptions {
        page_size: Some(MAX_PAGE_SIZE),
        ..Default::default()
    };

    let mut seen = HashSet::new();
    let mut uids = Vec::new();
    let mut response = source.query(&predicates, &options).await?;

    loop {
        for document in &response.results {
            match &document.uid {
                Some(uid) => {
                    if seen.insert(uid.clone()) {
                        uids.push(uid.clone());
                    }
                }
                None => tracing::warn!("Skipping {} document {} without uid", doc_type, document.id),
            }
        }

        match response.next_page.take() {
            Some(next) => {
                tracing::debug!("Following cursor {}", next);
                response = source.fetch_page(&next).await?;
            }
            None => break,
        }
    }

    Ok(uids)
}
