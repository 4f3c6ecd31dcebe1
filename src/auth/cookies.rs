use axum::http::{header, HeaderMap, HeaderValue};
use cookie::{time::Duration, Cookie, SameSite};

pub const SESSION_COOKIE: &str = "session";

/// `Set-Cookie` value for an http-only, same-site-lax cookie on `/`.
pub fn set_cookie(
    name: &'static str,
    value: &str,
    max_age_secs: i64,
    secure: bool,
) -> anyhow::Result<HeaderValue> {
    let cookie = Cookie::build((name, value.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(max_age_secs))
        .build();
    Ok(HeaderValue::from_str(&cookie.to_string())?)
}

/// `Set-Cookie` value that makes the browser drop `name`.
pub fn clear_cookie(name: &'static str, secure: bool) -> anyhow::Result<HeaderValue> {
    set_cookie(name, "", 0, secure)
}

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| Cookie::split_parse(s))
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}
