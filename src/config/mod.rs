//! Configuration module

mod site;

pub use site::SiteConfig;
pub use site::PrismicConfig;
pub use site::ReadingConfig;
pub use site::{ENV_ACCESS_TOKEN, ENV_API_ENDPOINT};
