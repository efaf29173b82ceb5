//! Built-in templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is off: every string
//! reaching a template is escaped when its data struct is built.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::richtext;
use crate::content::Post;
use crate::helpers::{html_escape, post_url, safe_url, url_for};
use crate::i18n::I18n;
use crate::view::{ListingView, ReadyPost};

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("spacetraveling/layout.html")),
            ("index.html", include_str!("spacetraveling/index.html")),
            ("post.html", include_str!("spacetraveling/post.html")),
            ("loading.html", include_str!("spacetraveling/loading.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("spacetraveling/partials/header.html"),
            ),
            (
                "partials/load_more.html",
                include_str!("spacetraveling/partials/load_more.html"),
            ),
        ])?;

        tera.register_filter("script_json", script_json_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// JSON for an inline `<script>`
///
/// `<` only occurs inside JSON strings, so writing it as `\u003c` keeps the
/// value from closing the script element.
fn script_json_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let json = serde_json::to_string(value).map_err(tera::Error::json)?;
    Ok(tera::Value::String(json.replace('<', "\\u003c")))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,
    pub root: String,
}

impl SiteData {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            title: html_escape(&config.title),
            description: html_escape(&config.description),
            language: html_escape(&config.language),
            timezone: config.timezone.clone(),
            root: url_for(config, "/"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostCardData {
    pub uid: String,
    pub href: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
}

impl PostCardData {
    pub fn new(post: &Post, root: &str) -> Self {
        Self {
            uid: html_escape(&post.uid),
            href: html_escape(&post_url(root, &post.uid)),
            title: html_escape(&post.data.title),
            subtitle: html_escape(&post.data.subtitle),
            author: html_escape(&post.data.author),
            date: html_escape(&post.first_publication_date),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    pub posts: Vec<PostCardData>,
    pub next_page: Option<String>,
    pub can_load_more: bool,
    pub notice: Option<String>,
    /// Used by the inline script to format merged posts
    pub months: Vec<String>,
    pub post_base: String,
}

impl ListingData {
    pub fn new(view: &ListingView, root: &str, i18n: &I18n) -> Self {
        Self {
            posts: view
                .posts()
                .iter()
                .map(|p| PostCardData::new(p, root))
                .collect(),
            next_page: view.next_page().map(html_escape),
            can_load_more: view.can_load_more(),
            notice: view.notice().map(html_escape),
            months: i18n.months(),
            post_base: post_url(root, ""),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockData {
    pub heading: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleData {
    pub uid: String,
    pub title: String,
    pub author: String,
    pub date: String,
    pub banner: String,
    pub read_time: String,
    pub blocks: Vec<BlockData>,
}

impl ArticleData {
    pub fn new(ready: &ReadyPost, root: &str, i18n: &I18n) -> Self {
        let post = &ready.post;
        Self {
            uid: html_escape(&post.uid),
            title: html_escape(&post.data.title),
            author: html_escape(&post.data.author),
            date: html_escape(&post.first_publication_date),
            banner: safe_url(&post.data.banner.url).unwrap_or_default(),
            read_time: html_escape(&i18n.get_count("read_time", ready.read_time)),
            blocks: post
                .data
                .content
                .iter()
                .map(|block| BlockData {
                    heading: html_escape(&block.heading),
                    html: richtext::as_html(&block.body, root),
                })
                .collect(),
        }
    }
}
