//! Credential extraction from incoming requests.
//!
//! A token may arrive as a query parameter, a header, or a cookie, all under
//! the name `Authorization`. The first source holding a non-empty value wins,
//! in that order, and only the winning value is inspected further. An
//! optional `Bearer ` scheme prefix is stripped from the winner.

use axum::http::{HeaderMap, Uri, header};

const FIELD: &str = "Authorization";

/// Pulls the raw token out of a request, if any part of it carries one.
///
/// Returns `None` only when no source supplied a value at all; a present but
/// unverifiable value is still returned so the caller can reject it as an
/// invalid token rather than a missing one.
pub fn token_from_request(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    from_query(uri)
        .or_else(|| from_header(headers))
        .or_else(|| from_cookie(headers))
        .map(strip_scheme)
}

fn from_query(uri: &Uri) -> Option<String> {
    for pair in uri.query()?.split('&') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        if name != FIELD {
            continue;
        }
        let Ok(value) = urlencoding::decode(value) else {
            continue;
        };
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

fn from_header(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

fn from_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in raw.split(';') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        if name.trim() != FIELD {
            continue;
        }
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

fn strip_scheme(raw: String) -> String {
    match raw.strip_prefix("Bearer ") {
        Some(rest) => rest.trim().to_string(),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(path_and_query: &str) -> Uri {
        path_and_query.parse().expect("test uri")
    }

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                axum::http::HeaderName::try_from(*name).expect("header name"),
                value.parse().expect("header value"),
            );
        }
        map
    }

    #[test]
    fn header_token_is_found_with_and_without_scheme() {
        let bare = headers(&[("Authorization", "tok-1")]);
        assert_eq!(
            token_from_request(&uri("/whoami"), &bare).as_deref(),
            Some("tok-1")
        );

        let bearer = headers(&[("Authorization", "Bearer tok-2")]);
        assert_eq!(
            token_from_request(&uri("/whoami"), &bearer).as_deref(),
            Some("tok-2")
        );
    }

    #[test]
    fn query_outranks_header_outranks_cookie() {
        let all = headers(&[
            ("Authorization", "from-header"),
            ("Cookie", "Authorization=from-cookie"),
        ]);
        assert_eq!(
            token_from_request(&uri("/whoami?Authorization=from-query"), &all).as_deref(),
            Some("from-query")
        );

        let header_and_cookie = headers(&[
            ("Authorization", "from-header"),
            ("Cookie", "Authorization=from-cookie"),
        ]);
        assert_eq!(
            token_from_request(&uri("/whoami"), &header_and_cookie).as_deref(),
            Some("from-header")
        );

        let cookie_only = headers(&[("Cookie", "theme=dark; Authorization=from-cookie")]);
        assert_eq!(
            token_from_request(&uri("/whoami"), &cookie_only).as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn empty_sources_fall_through_to_the_next_one() {
        let map = headers(&[("Authorization", "   "), ("Cookie", "Authorization=tok-3")]);
        assert_eq!(
            token_from_request(&uri("/whoami?Authorization="), &map).as_deref(),
            Some("tok-3")
        );
    }

    #[test]
    fn query_values_are_url_decoded() {
        let map = HeaderMap::new();
        assert_eq!(
            token_from_request(&uri("/whoami?Authorization=Bearer%20tok-4"), &map).as_deref(),
            Some("tok-4")
        );
    }

    #[test]
    fn absent_everywhere_yields_none() {
        assert_eq!(
            token_from_request(&uri("/whoami?page=2"), &HeaderMap::new()),
            None
        );
    }

    #[test]
    fn unrelated_query_and_cookie_names_are_ignored() {
        let map = headers(&[("Cookie", "authorization=lowercase-does-not-count")]);
        assert_eq!(
            token_from_request(&uri("/whoami?auth=nope"), &map),
            None
        );
    }
}
