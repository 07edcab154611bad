//! Cookie filtering for storage-state export.

use crate::engine::Cookie;
use url::Url;

/// Keep only the cookies relevant to the given URLs (the URLs currently open
/// in attached tabs).
pub fn filter_cookies(cookies: Vec<Cookie>, urls: &[Url]) -> Vec<Cookie> {
    cookies
        .into_iter()
        .filter(|cookie| urls.iter().any(|url| cookie_matches(cookie, url)))
        .collect()
}

/// Domain suffix match with leading-dot normalization, path-prefix match,
/// and secure cookies only over HTTPS or on localhost.
fn cookie_matches(cookie: &Cookie, url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };

    let domain = cookie.domain.strip_prefix('.').unwrap_or(&cookie.domain);
    let domain_ok = host == domain || host.ends_with(&format!(".{domain}"));

    let path_ok = url.path().starts_with(&cookie.path);

    let secure_ok =
        !cookie.secure || url.scheme() == "https" || matches!(host, "localhost" | "127.0.0.1");

    domain_ok && path_ok && secure_ok
}
