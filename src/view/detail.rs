//! Detail view: a single post, or the fallback shown while it resolves

use super::ViewError;
use crate::cms::ContentSource;
use crate::content::reading::read_time;
use crate::content::{PostDetail, Projector};

/// A post ready to be rendered
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyPost {
    pub post: PostDetail,
    /// Estimated minutes to read the whole body
    pub read_time: usize,
}

/// `Loading` until the post is known, then `Ready` for good
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Loading { uid: String },
    Ready(Box<ReadyPost>),
}

impl DetailView {
    /// Fallback state for a uid that was not generated ahead of time
    pub fn loading(uid: impl Into<String>) -> Self {
        DetailView::Loading { uid: uid.into() }
    }

    pub fn ready(post: PostDetail, words_per_minute: usize) -> Self {
        let read_time = read_time(&post.data.content, words_per_minute);
        DetailView::Ready(Box::new(ReadyPost { post, read_time }))
    }

    pub fn uid(&self) -> &str {
        match self {
            DetailView::Loading { uid } => uid,
            DetailView::Ready(ready) => &ready.post.uid,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DetailView::Loading { .. })
    }

    pub fn post(&self) -> Option<&ReadyPost> {
        match self {
            DetailView::Ready(ready) => Some(ready),
            DetailView::Loading { .. } => None,
        }
    }

    /// Fetch and project the post, moving `Loading` to `Ready`
    ///
    /// Returns whether the view is ready. A post the source does not know
    /// leaves the view loading; other failures are returned.
    pub async fn resolve<S>(
        &mut self,
        source: &S,
        doc_type: &str,
        projector: &Projector,
        words_per_minute: usize,
    ) -> Result<bool, ViewError>
    where
        S: ContentSource + ?Sized,
    {
        let uid = match self {
            DetailView::Ready(_) => return Ok(true),
            DetailView::Loading { uid } => uid.clone(),
        };

        let raw = match source.get_by_uid(doc_type, &uid).await {
            Ok(raw) => raw,
            Err(e) if e.is_not_found() => {
                tracing::info!("Post {} not found, staying on fallback", uid);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let post = projector.project_detail(&raw)?;
        *self = DetailView::ready(post, words_per_minute);
        Ok(true)
    }
}
