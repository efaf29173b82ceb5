//! Prismic REST API v2 client

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::{ApiResponse, CmsError, ContentSource, Predicate, QueryOptions, RawDocument};
use crate::config::PrismicConfig;

/// API root document, only the refs are of interest
#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default)]
    label: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// reqwest-based [`ContentSource`] for a Prismic repository
pub struct PrismicClient {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
    master_ref: OnceCell<String>,
}

impl PrismicClient {
    /// Create a client for the repository described by `config`
    pub fn new(config: &PrismicConfig) -> Result<Self, CmsError> {
        let client = Client::builder()
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            master_ref: OnceCell::new(),
        })
    }

    /// The API root this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Resolve the master ref once and reuse it for every search
    async fn master_ref(&self) -> Result<String, CmsError> {
        let reference = self
            .master_ref
            .get_or_try_init(|| self.fetch_master_ref())
            .await?;
        Ok(reference.clone())
    }

    async fn fetch_master_ref(&self) -> Result<String, CmsError> {
        let root: ApiRoot = self.get_json(&self.endpoint, &self.auth_params()).await?;
        let master = root
            .refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .ok_or_else(|| CmsError::NoMasterRef(self.endpoint.clone()))?;
        tracing::debug!("Using ref {} ({})", master.reference, master.label);
        Ok(master.reference)
    }

    fn auth_params(&self) -> Vec<(&'static str, String)> {
        self.access_token
            .iter()
            .map(|token| ("access_token", token.clone()))
            .collect()
    }

    async fn search(&self, params: Vec<(&'static str, String)>) -> Result<ApiResponse, CmsError> {
        let url = format!("{}/documents/search", self.endpoint);
        self.get_json(&url, &params).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, CmsError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let mut url = response.url().clone();
            url.set_query(None);
            return Err(CmsError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiResponse, CmsError> {
        let mut params = vec![
            ("ref", self.master_ref().await?),
            ("q", super::to_query(predicates)),
        ];
        if !options.fetch.is_empty() {
            params.push(("fetch", options.fetch.join(",")));
        }
        if let Some(page_size) = options.page_size {
            params.push(("pageSize", page_size.to_string()));
        }
        if let Some(page) = options.page {
            params.push(("page", page.to_string()));
        }
        if let Some(orderings) = &options.orderings {
            params.push(("orderings", orderings.clone()));
        }
        params.extend(self.auth_params());

        let response = self.search(params).await?;
        tracing::debug!(
            "Query returned {} of {} documents",
            response.results.len(),
            response.total_results_size
        );
        Ok(response)
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<RawDocument, CmsError> {
        let predicate = Predicate::at(format!("my.{}.uid", doc_type), uid);
        let options = QueryOptions {
            page_size: Some(1),
            ..Default::default()
        };

        let response = self.query(&[predicate], &options).await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| CmsError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn fetch_page(&self, url: &str) -> Result<ApiResponse, CmsError> {
        // Cursors carry their own query; only the token may be missing
        let has_token = Url::parse(url)
            .map(|u| u.query_pairs().any(|(k, _)| k == "access_token"))
            .unwrap_or(false);
        let params = if has_token {
            Vec::new()
        } else {
            self.auth_params()
        };
        self.get_json(url, &params).await
    }
}
