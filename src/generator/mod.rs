//! Generator module - renders the listing and post pages into the public directory

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tera::Context;
use walkdir::WalkDir;

use crate::cms::{self, ContentSource};
use crate::content::Projector;
use crate::i18n::I18n;
use crate::templates::{ArticleData, ListingData, SiteData, TemplateRenderer};
use crate::view::{DetailView, Header, ListingView};
use crate::Blog;

/// What a full generation produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub posts: usize,
    pub skipped: usize,
    pub assets: usize,
}

/// Static site generator backed by a content source
pub struct Generator {
    blog: Blog,
    source: Arc<dyn ContentSource>,
    renderer: TemplateRenderer,
    i18n: I18n,
    projector: Projector,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let i18n = blog.i18n()?;
        let projector = Projector::from_config(&blog.config, &i18n)?;

        Ok(Self {
            blog: blog.clone(),
            source,
            renderer,
            i18n,
            projector,
        })
    }

    pub fn source(&self) -> &dyn ContentSource {
        self.source.as_ref()
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<GenerateSummary> {
        tokio::fs::create_dir_all(&self.blog.public_dir).await?;

        let assets = self.copy_static_assets()?;

        self.generate_listing().await?;

        let doc_type = &self.blog.config.prismic.document_type;
        let uids = cms::collect_uids(self.source(), doc_type)
            .await
            .context("Failed to enumerate posts")?;
        tracing::info!("Found {} posts", uids.len());

        let mut summary = GenerateSummary {
            assets,
            ..Default::default()
        };
        for uid in &uids {
            match self.generate_post(uid).await? {
                Some(_) => summary.posts += 1,
                None => summary.skipped += 1,
            }
        }

        Ok(summary)
    }

    /// Fetch the first listing page and write `index.html`
    pub async fn generate_listing(&self) -> Result<ListingView> {
        let view = ListingView::initial(
            self.source(),
            &self.blog.config.prismic,
            self.projector.clone(),
        )
        .await
        .context("Failed to fetch the listing")?;

        let html = self.render_listing(&view)?;
        let output_path = self.blog.public_dir.join("index.html");
        write_page(&output_path, &html).await?;
        tracing::debug!("Generated: {:?}", output_path);

        Ok(view)
    }

    /// Fetch one post and write its page; `None` if the source does not know it
    pub async fn generate_post(&self, uid: &str) -> Result<Option<PathBuf>> {
        let config = &self.blog.config;
        let mut view = DetailView::loading(uid);
        let ready = view
            .resolve(
                self.source(),
                &config.prismic.document_type,
                &self.projector,
                config.reading.words_per_minute,
            )
            .await
            .with_context(|| format!("Failed to build post {}", uid))?;

        if !ready {
            tracing::warn!("Post {} disappeared from the source, skipping", uid);
            return Ok(None);
        }

        let html = self.render_detail(&view, None)?;
        let output_path = self.post_output_path(uid);
        write_page(&output_path, &html).await?;
        tracing::debug!("Generated post: {:?}", output_path);

        Ok(Some(output_path))
    }

    /// Where the page for `uid` is written
    pub fn post_output_path(&self, uid: &str) -> PathBuf {
        self.blog
            .public_dir
            .join("post")
            .join(uid)
            .join("index.html")
    }

    pub fn render_listing(&self, view: &ListingView) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert(
            "listing",
            &ListingData::new(view, &self.root(), &self.i18n),
        );
        self.renderer.render("index.html", &context)
    }

    /// Render a detail view; a loading view may ask the browser to refresh
    pub fn render_detail(&self, view: &DetailView, refresh: Option<u64>) -> Result<String> {
        let mut context = self.create_base_context();
        match view {
            DetailView::Loading { .. } => {
                if let Some(seconds) = refresh {
                    context.insert("refresh", &seconds);
                }
                self.renderer.render("loading.html", &context)
            }
            DetailView::Ready(ready) => {
                context.insert("article", &ArticleData::new(ready, &self.root(), &self.i18n));
                self.renderer.render("post.html", &context)
            }
        }
    }

    /// The page shown while `uid` is being generated
    pub fn render_fallback(&self, uid: &str, refresh: Option<u64>) -> Result<String> {
        self.render_detail(&DetailView::loading(uid), refresh)
    }

    fn root(&self) -> String {
        crate::helpers::url_for(&self.blog.config, "/")
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::new(&self.blog.config));
        context.insert("header", &Header::new(&self.blog.config, &self.i18n));
        context.insert("t", &self.i18n.get_all_translations());
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context
    }

    /// Copy the static directory (logo, styles) into the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(static_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
            copied += 1;
        }

        tracing::debug!("Copied {} static files", copied);
        Ok(copied)
    }
}

async fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    tokio::fs::write(path, html)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
