//! Provider-name inference from request URLs.

use url::Url;

/// Provider name used when none can be inferred.
pub const UNKNOWN_PROVIDER: &str = "unknown-provider";

const PLACEHOLDER_BASE: &str = "http://placeholder.local";

/// First path segment of `url`, which may be absolute or relative.
///
/// `http://localhost/todo-service/todos` and `/todo-service/todos` both give
/// `todo-service`.
#[must_use]
pub fn infer_provider_name(url: &str) -> Option<String> {
    let pathname = Url::parse(url)
        .or_else(|_| Url::parse(PLACEHOLDER_BASE).and_then(|base| base.join(url)))
        .map_or_else(|_| url.to_string(), |parsed| parsed.path().to_string());

    pathname
        .trim_start_matches(['/', '#'])
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}
