//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling
description: ''
language: pt-BR
timezone: America/Sao_Paulo

# URL
url: http://localhost:4000
root: /
logo: /Logo.svg

# Directory
public_dir: public
static_dir: static

# Prismic repository
## PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN override these
prismic:
  endpoint: https://your-repository.cdn.prismic.io/api/v2
  document_type: posts
  page_size: 1
  fetch:
    - posts.title
    - posts.subtitle
    - posts.author
    - posts.content
    - posts.banner

# Reading time
reading:
  words_per_minute: 200

# Seconds before the server regenerates a post page
revalidate: 1800
"#;

const ENV_TEMPLATE: &str = "PRISMIC_API_ENDPOINT=https://your-repository.cdn.prismic.io/api/v2\nPRISMIC_ACCESS_TOKEN=\n";

const LOGO: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="240" height="26" viewBox="0 0 240 26"><text x="0" y="20" font-family="sans-serif" font-size="22" fill="#fff">spacetraveling<tspan fill="#ff57b2">.</tspan></text></svg>
"##;

/// Initialize a new blog in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("Already initialized: {:?}", config_path);
    }

    fs::create_dir_all(target_dir.join("static"))?;
    fs::write(&config_path, CONFIG_TEMPLATE)?;
    fs::write(target_dir.join(".env.example"), ENV_TEMPLATE)?;

    let logo_path = target_dir.join("static/Logo.svg");
    if !logo_path.exists() {
        fs::write(logo_path, LOGO)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let config = SiteConfig::load(dir.path().join("_config.yml")).unwrap();
        assert_eq!(config.prismic.document_type, "posts");
        assert_eq!(config.prismic.page_size, 1);
        assert_eq!(config.revalidate, 1800);
        assert!(dir.path().join(".env.example").exists());
        assert!(dir.path().join("static/Logo.svg").exists());
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}
