//! Content module - posts, their projection and derived fields

mod post;
pub mod reading;
pub mod richtext;

pub use post::{
    Banner, ContentBlock, Post, PostData, PostDetail, PostDetailData, ProjectionError, Projector,
};
pub use richtext::RichTextNode;
