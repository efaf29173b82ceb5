//! In-memory content source for tests

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{ApiResponse, CmsError, ContentSource, Predicate, QueryOptions, RawDocument};

const STUB_SEARCH: &str = "https://cms.test/api/v2/documents/search";

/// Serves a fixed set of documents in pages of `page_size`
pub struct StubSource {
    documents: Vec<RawDocument>,
    page_size: usize,
    responses: HashMap<String, ApiResponse>,
    failing: Mutex<HashSet<String>>,
    fetched: Mutex<Vec<String>>,
    lookups: AtomicUsize,
    lookup_delay: Option<Duration>,
}

impl StubSource {
    pub fn new(documents: Vec<RawDocument>, page_size: usize) -> Self {
        Self {
            documents,
            page_size: page_size.max(1),
            responses: HashMap::new(),
            failing: Mutex::new(HashSet::new()),
            fetched: Mutex::new(Vec::new()),
            lookups: AtomicUsize::new(0),
            lookup_delay: None,
        }
    }

    /// Cursor for page `page` of this stub
    pub fn page_url(page: usize) -> String {
        format!("{}?page={}", STUB_SEARCH, page)
    }

    /// Answer `url` with a canned response instead of a computed page
    pub fn with_response(mut self, url: &str, response: ApiResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    /// Hold every uid lookup for `delay` before answering
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    /// Number of `get_by_uid` calls served so far
    pub fn uid_lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Make every fetch of `url` fail with a 503
    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    /// Let `url` succeed again
    pub fn recover(&self, url: &str) {
        self.failing.lock().unwrap().remove(url);
    }

    /// Number of cursor fetches served so far
    pub fn fetched_pages(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    fn of_type(&self, doc_type: &str) -> Vec<RawDocument> {
        self.documents
            .iter()
            .filter(|d| d.doc_type == doc_type)
            .cloned()
            .collect()
    }

    fn page(&self, documents: &[RawDocument], page: usize) -> ApiResponse {
        let total = documents.len();
        let total_pages = total.div_ceil(self.page_size).max(1);
        let start = ((page - 1) * self.page_size).min(total);
        let end = (start + self.page_size).min(total);

        ApiResponse {
            page: page as u32,
            results_per_page: self.page_size as u32,
            results_size: (end - start) as u32,
            total_results_size: total as u32,
            total_pages: total_pages as u32,
            next_page: (page < total_pages).then(|| Self::page_url(page + 1)),
            prev_page: (page > 1).then(|| Self::page_url(page - 1)),
            results: documents[start..end].to_vec(),
        }
    }
}

#[async_trait]
impl ContentSource for StubSource {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiResponse, CmsError> {
        let doc_type = predicates
            .iter()
            .find_map(|p| match p {
                Predicate::At { path, value } if path == "document.type" => Some(value.as_str()),
                _ => None,
            })
            .unwrap_or("posts");
        let page = options.page.unwrap_or(1).max(1) as usize;
        Ok(self.page(&self.of_type(doc_type), page))
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<RawDocument, CmsError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }

        self.documents
            .iter()
            .find(|d| d.doc_type == doc_type && d.uid.as_deref() == Some(uid))
            .cloned()
            .ok_or_else(|| CmsError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn fetch_page(&self, url: &str) -> Result<ApiResponse, CmsError> {
        self.fetched.lock().unwrap().push(url.to_string());

        if self.failing.lock().unwrap().contains(url) {
            return Err(CmsError::Status {
                status: 503,
                url: url.to_string(),
            });
        }
        if let Some(response) = self.responses.get(url) {
            return Ok(response.clone());
        }

        let page = url
            .rsplit_once("page=")
            .and_then(|(_, n)| n.parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        Ok(self.page(&self.of_type("posts"), page))
    }
}

/// A complete `posts` document with two content blocks
pub fn document(uid: &str, title: &str) -> RawDocument {
    serde_json::from_value(json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "posts",
        "first_publication_date": "2021-03-15T19:25:28+0000",
        "last_publication_date": "2021-03-25T19:25:28+0000",
        "data": {
            "title": title,
            "subtitle": format!("Tudo sobre {}", title),
            "author": "Joseph Oliveira",
            "banner": { "url": format!("https://images.prismic.io/{}.png", uid) },
            "content": [
                {
                    "heading": "Proin et varius",
                    "body": [
                        { "type": "paragraph", "text": "Lorem ipsum dolor sit amet", "spans": [] }
                    ]
                },
                {
                    "heading": "Cras laoreet mi",
                    "body": [
                        { "type": "paragraph", "text": "Nullam dolor sapien", "spans": [] },
                        { "type": "list-item", "text": "Ut varius", "spans": [] }
                    ]
                }
            ]
        }
    }))
    .unwrap()
}
