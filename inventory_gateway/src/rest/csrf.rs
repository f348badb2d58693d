use reqwest::cookie::{CookieStore, Jar};
use url::Url;

pub(crate) const CSRF_COOKIE: &str = "csrftoken";
pub(crate) const CSRF_HEADER: &str = "X-CSRFToken";

/// The CSRF token the server last set for `url`, if any.
pub(crate) fn token(jar: &Jar, url: &Url) -> Option<String> {
    let header = jar.cookies(url)?;
    find_cookie(header.to_str().ok()?, CSRF_COOKIE)
}

fn find_cookie(raw: &str, name: &str) -> Option<String> {
    raw.split(';').map(str::trim).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
