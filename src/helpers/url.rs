//! URL helper functions

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters escaped in a path segment (RFC 3986 unreserved are kept)
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    url_under(&config.root, path)
}

/// Join `path` under a root such as `/` or `/blog/`
pub fn url_under(root: &str, path: &str) -> String {
    let root = root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Route of a post detail page
///
/// # Examples
/// ```ignore
/// post_url("/", "como-utilizar-hooks") // -> "/post/como-utilizar-hooks"
/// ```
pub fn post_url(root: &str, uid: &str) -> String {
    url_under(root, &format!("post/{}", encode_url(uid)))
}

/// Encode a URL path segment
pub fn encode_url(path: &str) -> String {
    percent_encoding::utf8_percent_encode(path, SEGMENT).to_string()
}
