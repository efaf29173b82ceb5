//! View state for the listing and detail pages

mod detail;
mod header;
mod listing;

use thiserror::Error;

use crate::cms::CmsError;
use crate::content::ProjectionError;

pub use detail::{DetailView, ReadyPost};
pub use header::Header;
pub use listing::{FetchState, ListingView, LoadOutcome, LoadTicket, PostPagination};

/// Failure while filling a view
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Cms(#[from] CmsError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}
