//! Post models and their projection from CMS documents

use anyhow::anyhow;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::richtext::{self, RichTextNode};
use crate::cms::RawDocument;
use crate::config::SiteConfig;
use crate::helpers::{format_day_month_year, parse_cms_date};
use crate::i18n::I18n;

/// Raised when a document lacks what a post needs
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid publication date: {0}")]
    InvalidDate(String),

    #[error("Malformed field {field}: {source}")]
    Malformed {
        field: String,
        source: serde_json::Error,
    },
}

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Stable identity, used for routing and list keys
    pub uid: String,
    /// Already formatted as `dd MMM yyyy`
    pub first_publication_date: String,
    pub data: PostData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A post with everything the detail page shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: String,
    pub data: PostDetailData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetailData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub url: String,
}

/// A titled section of a post body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: Vec<RichTextNode>,
}

impl PostDetail {
    /// The listing form of this post
    pub fn summary(&self) -> Post {
        Post {
            uid: self.uid.clone(),
            first_publication_date: self.first_publication_date.clone(),
            data: PostData {
                title: self.data.title.clone(),
                subtitle: self.data.subtitle.clone(),
                author: self.data.author.clone(),
            },
        }
    }
}

/// Maps raw documents to posts
///
/// Projection only reads the document, so the same document always
/// projects to the same post.
#[derive(Debug, Clone)]
pub struct Projector {
    timezone: Tz,
    months: Vec<String>,
}

impl Projector {
    pub fn new(timezone: Tz, i18n: &I18n) -> Self {
        Self {
            timezone,
            months: i18n.months(),
        }
    }

    /// Projector using the site's timezone and language
    pub fn from_config(config: &SiteConfig, i18n: &I18n) -> anyhow::Result<Self> {
        let timezone = if config.timezone.trim().is_empty() {
            Tz::UTC
        } else {
            config
                .timezone
                .parse::<Tz>()
                .map_err(|e| anyhow!("Invalid timezone {:?}: {}", config.timezone, e))?
        };
        Ok(Self::new(timezone, i18n))
    }

    /// Format a CMS timestamp as `dd MMM yyyy` in the site timezone
    pub fn format_date(&self, raw: &str) -> Result<String, ProjectionError> {
        let date = parse_cms_date(raw).ok_or_else(|| ProjectionError::InvalidDate(raw.to_string()))?;
        Ok(format_day_month_year(
            &date.with_timezone(&self.timezone),
            &self.months,
        ))
    }

    /// Project the listing form
    pub fn project_post(&self, raw: &RawDocument) -> Result<Post, ProjectionError> {
        Ok(Post {
            uid: uid(raw)?,
            first_publication_date: self.publication_date(raw)?,
            data: PostData {
                title: text_field(&raw.data, "title")?,
                subtitle: optional_text_field(&raw.data, "subtitle")?,
                author: text_field(&raw.data, "author")?,
            },
        })
    }

    /// Project the detail form
    pub fn project_detail(&self, raw: &RawDocument) -> Result<PostDetail, ProjectionError> {
        let summary = self.project_post(raw)?;

        let banner_url = raw
            .data
            .get("banner")
            .and_then(|b| b.get("url"))
            .and_then(Value::as_str)
            .ok_or_else(|| ProjectionError::MissingField("banner.url".to_string()))?;

        Ok(PostDetail {
            uid: summary.uid,
            first_publication_date: summary.first_publication_date,
            data: PostDetailData {
                title: summary.data.title,
                subtitle: summary.data.subtitle,
                author: summary.data.author,
                banner: Banner {
                    url: banner_url.to_string(),
                },
                content: content_blocks(&raw.data)?,
            },
        })
    }

    fn publication_date(&self, raw: &RawDocument) -> Result<String, ProjectionError> {
        let date = raw
            .first_publication_date
            .as_deref()
            .ok_or_else(|| ProjectionError::MissingField("first_publication_date".to_string()))?;
        self.format_date(date)
    }
}

fn uid(raw: &RawDocument) -> Result<String, ProjectionError> {
    raw.uid
        .clone()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ProjectionError::MissingField("uid".to_string()))
}

/// A text field stored either as plain text or as a rich-text title
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(_) => serde_json::from_value::<Vec<RichTextNode>>(value.clone())
            .ok()
            .map(|nodes| richtext::as_text(&nodes)),
        _ => None,
    }
}

fn text_field(data: &Value, field: &str) -> Result<String, ProjectionError> {
    data.get(field)
        .and_then(as_text)
        .ok_or_else(|| ProjectionError::MissingField(field.to_string()))
}

/// Like [`text_field`], but an explicit `null` reads as empty
fn optional_text_field(data: &Value, field: &str) -> Result<String, ProjectionError> {
    match data.get(field) {
        Some(Value::Null) => Ok(String::new()),
        _ => text_field(data, field),
    }
}

fn content_blocks(data: &Value) -> Result<Vec<ContentBlock>, ProjectionError> {
    let items = data
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| ProjectionError::MissingField("content".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let heading = optional_text_field(item, "heading")
                .map_err(|_| ProjectionError::MissingField(format!("content[{}].heading", i)))?;
            let body = match item.get("body") {
                None | Some(Value::Null) => Vec::new(),
                Some(body) => serde_json::from_value(body.clone()).map_err(|source| {
                    ProjectionError::Malformed {
                        field: format!("content[{}].body", i),
                        source,
                    }
                })?,
            };
            Ok(ContentBlock { heading, body })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::testing::document;
    use serde_json::json;

    fn projector() -> Projector {
        Projector::new(chrono_tz::America::Sao_Paulo, &I18n::new("pt-BR"))
    }

    #[test]
    fn test_project_post() {
        let raw = document("como-utilizar-hooks", "Como utilizar Hooks");
        let post = projector().project_post(&raw).unwrap();

        assert_eq!(post.uid, "como-utilizar-hooks");
        assert_eq!(post.first_publication_date, "15 mar 2021");
        assert_eq!(post.data.title, "Como utilizar Hooks");
        assert_eq!(post.data.subtitle, "Tudo sobre Como utilizar Hooks");
        assert_eq!(post.data.author, "Joseph Oliveira");
    }

    #[test]
    fn test_projection_is_pure() {
        let raw = document("criando-um-app", "Criando um app");
        let before = raw.clone();
        let projector = projector();

        let first = projector.project_detail(&raw).unwrap();
        let second = projector.project_detail(&raw).unwrap();

        assert_eq!(first, second);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_project_detail() {
        let raw = document("criando-um-app", "Criando um app");
        let post = projector().project_detail(&raw).unwrap();

        assert_eq!(post.data.banner.url, "https://images.prismic.io/criando-um-app.png");
        assert_eq!(post.data.content.len(), 2);
        assert_eq!(post.data.content[0].heading, "Proin et varius");
        assert_eq!(post.data.content[1].body.len(), 2);
        assert_eq!(post.data.content[1].body[1].kind, "list-item");
        assert_eq!(post.summary(), projector().project_post(&raw).unwrap());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let mut raw = document("sem-autor", "Sem autor");
        raw.data.as_object_mut().unwrap().remove("author");

        match projector().project_post(&raw) {
            Err(ProjectionError::MissingField(field)) => assert_eq!(field, "author"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_uid_fails() {
        let mut raw = document("x", "X");
        raw.uid = None;
        assert!(matches!(
            projector().project_post(&raw),
            Err(ProjectionError::MissingField(f)) if f == "uid"
        ));
    }

    #[test]
    fn test_null_subtitle_is_empty() {
        let mut raw = document("sem-subtitulo", "Sem subtítulo");
        raw.data["subtitle"] = Value::Null;
        let post = projector().project_post(&raw).unwrap();
        assert_eq!(post.data.subtitle, "");
    }

    #[test]
    fn test_rich_text_title_is_flattened() {
        let mut raw = document("titulo-rico", "ignored");
        raw.data["title"] = json!([{ "type": "heading1", "text": "Título rico", "spans": [] }]);
        let post = projector().project_post(&raw).unwrap();
        assert_eq!(post.data.title, "Título rico");
    }

    #[test]
    fn test_empty_body_is_allowed() {
        let mut raw = document("vazio", "Vazio");
        raw.data["content"] = json!([{ "heading": "Só o título", "body": [] }]);
        let post = projector().project_detail(&raw).unwrap();
        assert!(post.data.content[0].body.is_empty());
    }

    #[test]
    fn test_invalid_date_fails() {
        let mut raw = document("data-ruim", "Data ruim");
        raw.first_publication_date = Some("yesterday".to_string());
        assert!(matches!(
            projector().project_post(&raw),
            Err(ProjectionError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_missing_banner_fails_detail_only() {
        let mut raw = document("sem-banner", "Sem banner");
        raw.data["banner"] = json!({});
        assert!(projector().project_post(&raw).is_ok());
        assert!(matches!(
            projector().project_detail(&raw),
            Err(ProjectionError::MissingField(f)) if f == "banner.url"
        ));
    }

    #[test]
    fn test_timezone_from_config() {
        let mut config = SiteConfig::default();
        config.timezone = "Mars/Olympus".to_string();
        assert!(Projector::from_config(&config, &I18n::default()).is_err());

        config.timezone = String::new();
        let projector = Projector::from_config(&config, &I18n::new("en")).unwrap();
        assert_eq!(projector.format_date("2021-03-16T01:00:00+0000").unwrap(), "16 Mar 2021");
    }
}
