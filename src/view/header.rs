//! Site header shared by every page

use serde::Serialize;

use crate::config::SiteConfig;
use crate::helpers::url_for;
use crate::i18n::I18n;

/// Logo linking back to the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub home: String,
    pub logo: String,
    pub logo_alt: String,
}

impl Header {
    pub fn new(config: &SiteConfig, i18n: &I18n) -> Self {
        let logo = if config.logo.starts_with("http://") || config.logo.starts_with("https://") {
            config.logo.clone()
        } else {
            url_for(config, &config.logo)
        };

        Self {
            home: url_for(config, "/"),
            logo,
            logo_alt: i18n.get("logo_alt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_under_root() {
        let mut config = SiteConfig::default();
        config.root = "/blog/".to_string();
        let header = Header::new(&config, &I18n::new("pt-BR"));

        assert_eq!(header.home, "/blog/");
        assert_eq!(header.logo, "/blog/Logo.svg");
        assert_eq!(header.logo_alt, "logo");
    }

    #[test]
    fn test_absolute_logo_is_kept() {
        let mut config = SiteConfig::default();
        config.logo = "https://cdn.example.com/logo.svg".to_string();
        let header = Header::new(&config, &I18n::default());
        assert_eq!(header.logo, "https://cdn.example.com/logo.svg");
    }
}
