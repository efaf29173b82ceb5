//! List the posts of the configured repository

use anyhow::Result;
use std::io::Write;

use crate::cms::ContentSource;
use crate::config::PrismicConfig;
use crate::content::Projector;
use crate::view::{ListingView, LoadOutcome};
use crate::Blog;

/// Print the listing, following the cursor for `pages` pages (all if `None`)
pub async fn run(blog: &Blog, pages: Option<usize>) -> Result<()> {
    let i18n = blog.i18n()?;
    let projector = Projector::from_config(&blog.config, &i18n)?;
    let source = blog.source()?;

    let mut out = std::io::stdout();
    list_posts(source.as_ref(), &blog.config.prismic, projector, pages, &mut out).await
}

pub async fn list_posts<S, W>(
    source: &S,
    config: &PrismicConfig,
    projector: Projector,
    pages: Option<usize>,
    out: &mut W,
) -> Result<()>
where
    S: ContentSource + ?Sized,
    W: Write,
{
    let mut view = ListingView::initial(source, config, projector).await?;

    let mut loaded = 1;
    while pages.map_or(true, |limit| loaded < limit) {
        match view.load_more(source).await {
            Ok(LoadOutcome::Appended(_)) => loaded += 1,
            Ok(LoadOutcome::Exhausted) | Ok(LoadOutcome::Skipped) => break,
            // kept on the view as a notice
            Err(_) => break,
        }
    }

    writeln!(out, "Posts ({}):", view.posts().len())?;
    for post in view.posts() {
        writeln!(
            out,
            "  {} - {} [{}]",
            post.first_publication_date, post.data.title, post.uid
        )?;
    }

    if let Some(notice) = view.notice() {
        writeln!(out, "Could not load more posts: {}", notice)?;
    } else if let Some(next) = view.next_page() {
        writeln!(out, "More posts at {}", next)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::testing::{document, StubSource};
    use crate::i18n::I18n;

    fn source() -> StubSource {
        let docs = ["a", "b", "c"]
            .iter()
            .map(|uid| document(uid, &uid.to_uppercase()))
            .collect();
        StubSource::new(docs, 1)
    }

    async fn listing(source: &StubSource, pages: Option<usize>) -> String {
        let projector = Projector::new(chrono_tz::America::Sao_Paulo, &I18n::new("pt-BR"));
        let mut out = Vec::new();
        list_posts(source, &PrismicConfig::default(), projector, pages, &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_list_first_pages() {
        let output = listing(&source(), Some(2)).await;
        assert!(output.starts_with("Posts (2):\n"));
        assert!(output.contains("  15 mar 2021 - A [a]\n"));
        assert!(output.contains("  15 mar 2021 - B [b]\n"));
        assert!(output.contains(&format!("More posts at {}", StubSource::page_url(3))));
    }

    #[tokio::test]
    async fn test_list_all() {
        let output = listing(&source(), None).await;
        assert!(output.starts_with("Posts (3):\n"));
        assert!(!output.contains("More posts"));
    }

    #[tokio::test]
    async fn test_list_reports_failed_page() {
        let source = source();
        source.fail(&StubSource::page_url(2));

        let output = listing(&source, None).await;
        assert!(output.starts_with("Posts (1):\n"));
        assert!(output.contains("Could not load more posts"));
    }
}
