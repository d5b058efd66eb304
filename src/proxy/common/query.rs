// Inbound query parsing and upstream query construction

use url::form_urlencoded;

/// Reserved inbound key naming the upstream sub-path
pub const ENDPOINT_PARAM: &str = "endpoint";

/// Parameters injected ahead of everything the caller sends
#[derive(Debug, Clone)]
pub struct QueryDefaults {
    pub api_key: String,
    pub language: String,
    pub include_adult: bool,
}

/// Inbound query split into the target sub-path and the pass-through pairs.
///
/// Pairs are kept in the order the caller sent them, repeated keys included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundQuery {
    pub endpoint: Option<String>,
    pub passthrough: Vec<(String, String)>,
}

impl InboundQuery {
    /// Parse a raw (still percent-encoded) query string.
    ///
    /// The first `endpoint` value wins; every `endpoint` pair is removed from
    /// the pass-through set.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();

        let Some(raw) = raw else {
            return query;
        };

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            if key == ENDPOINT_PARAM {
                if query.endpoint.is_none() {
                    query.endpoint = Some(value.into_owned());
                }
                continue;
            }
            query.passthrough.push((key.into_owned(), value.into_owned()));
        }

        query
    }
}

/// Serialize the upstream query string.
///
/// Defaults come first (`api_key`, `language`, `include_adult`), then the
/// caller's pairs are appended. Nothing is replaced, so a caller-supplied
/// `language` shows up as a second value after the default one.
pub fn build_upstream_query(defaults: &QueryDefaults, passthrough: &[(String, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer
        .append_pair("api_key", &defaults.api_key)
        .append_pair("language", &defaults.language)
        .append_pair(
            "include_adult",
            if defaults.include_adult { "true" } else { "false" },
        );

    for (key, value) in passthrough {
        serializer.append_pair(key, value);
    }

    serializer.finish()
}
