//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape text and turn line breaks into `<br />`
pub fn text_to_html(s: &str) -> String {
    html_escape(s).replace('\n', "<br />")
}

/// Only allow web and relative links into `href`/`src` attributes
pub fn safe_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    let allowed = lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || trimmed.starts_with('/')
        || trimmed.starts_with('#');
    allowed.then(|| html_escape(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_text_to_html() {
        assert_eq!(text_to_html("a < b\nc"), "a &lt; b<br />c");
    }

    #[test]
    fn test_safe_url() {
        assert_eq!(safe_url("https://example.com/?a=1&b=2").unwrap(), "https://example.com/?a=1&amp;b=2");
        assert_eq!(safe_url("/post/hello").unwrap(), "/post/hello");
        assert!(safe_url("javascript:alert(1)").is_none());
    }
}
