// Validation of the caller-supplied upstream sub-path

use crate::error::ProxyError;

/// Check that `endpoint` is a plain absolute sub-path safe to append to the
/// upstream base URL.
///
/// Accepts `/discover/movie`, `/movie/550/credits`, `/configuration`.
/// Rejects anything that could escape the base path or smuggle in a query or
/// fragment: relative paths, `.`/`..` segments, empty segments, backslashes,
/// `?`, `#`, `%`, whitespace and control characters.
pub fn validate_endpoint(endpoint: Option<&str>) -> Result<&str, ProxyError> {
    let endpoint = match endpoint {
        Some(e) if !e.is_empty() => e,
        _ => return Err(ProxyError::MissingEndpoint),
    };

    if !endpoint.starts_with('/') {
        return Err(ProxyError::InvalidEndpoint("must start with '/'"));
    }

    if let Some(c) = endpoint
        .chars()
        .find(|c| matches!(c, '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
    {
        return Err(ProxyError::InvalidEndpoint(match c {
            '?' | '#' => "must not contain a query or fragment",
            '%' => "must not contain percent-encoded characters",
            _ => "contains forbidden characters",
        }));
    }

    // Skip the leading empty segment produced by the initial '/'
    for segment in endpoint[1..].split('/') {
        match segment {
            "" if endpoint.len() > 1 => {
                return Err(ProxyError::InvalidEndpoint("must not contain empty segments"))
            }
            "." | ".." => {
                return Err(ProxyError::InvalidEndpoint("must not contain '.' or '..' segments"))
            }
            _ => {}
        }
    }

    Ok(endpoint)
}
