//! URL canonicalization for consistent request keys.

use url::Url;

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL as the page would issue it.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative references (`/about.html`, `styles/main.css`) against `origin`
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(origin: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("http://localhost:8080").unwrap()
    }

    #[test]
    fn test_canonicalize_absolute_path() {
        let url = canonicalize(&origin(), "/know_your_rep.html").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/know_your_rep.html");
    }

    #[test]
    fn test_canonicalize_relative_path() {
        let url = canonicalize(&origin(), "styles/main.css").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/styles/main.css");
    }

    #[test]
    fn test_canonicalize_absolute_url_kept() {
        let url = canonicalize(&origin(), "https://fonts.googleapis.com/css2?family=Inter").unwrap();
        assert_eq!(url.host_str(), Some("fonts.googleapis.com"));
        assert_eq!(url.query(), Some("family=Inter"));
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize(&origin(), "https://API.OPENAI.COM/v1").unwrap();
        assert_eq!(url.host_str(), Some("api.openai.com"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize(&origin(), "/about.html#team").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/about.html");
    }

    #[test]
    fn test_canonicalize_trim_whitespace() {
        let url = canonicalize(&origin(), "  /index.html  ").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/index.html");
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize(&origin(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize(&origin(), ""), Err(UrlError::Empty)));
        assert!(matches!(canonicalize(&origin(), "   "), Err(UrlError::Empty)));
    }
}
