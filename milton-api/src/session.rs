use axum::http::{header, HeaderMap};
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use milton_core::SessionContext;
use crate::error::AppError;
use crate::state::AppState;

/// Loads the visitor's session from the cookie, or starts a new one.
pub async fn open_session(state: &AppState, jar: &CookieJar) -> Result<SessionContext, AppError> {
    let id = jar.get(&state.cookie_name).map(|c| c.value().to_string());
    Ok(SessionContext::open(state.sessions.as_ref(), id.as_deref()).await?)
}

/// Writes back a changed session; a newly created one also gets its cookie.
pub async fn close_session(
    state: &AppState,
    jar: CookieJar,
    session: &mut SessionContext,
) -> Result<CookieJar, AppError> {
    let was_new = session.is_new();
    if !session.commit(state.sessions.as_ref()).await? || !was_new {
        return Ok(jar);
    }

    let cookie = Cookie::build((state.cookie_name.clone(), session.id().to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    Ok(jar.add(cookie))
}

/// Redirect to the page the request came from, when that is a local path.
pub fn back_or(headers: &HeaderMap, fallback: &str) -> Redirect {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(local_path)
        .map(|path| Redirect::to(&path))
        .unwrap_or_else(|| Redirect::to(fallback))
}

fn local_path(referer: &str) -> Option<String> {
    if referer.starts_with('/') && !referer.starts_with("//") {
        return Some(referer.to_string());
    }
    let (_, rest) = referer.split_once("://")?;
    match rest.find('/') {
        Some(index) => Some(rest[index..].to_string()),
        None => Some("/".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_strips_origin() {
        assert_eq!(local_path("http://localhost:3000/tours/1").as_deref(), Some("/tours/1"));
        assert_eq!(local_path("https://milton.example/order?x=1").as_deref(), Some("/order?x=1"));
        assert_eq!(local_path("https://milton.example").as_deref(), Some("/"));
        assert_eq!(local_path("/checkout").as_deref(), Some("/checkout"));
        assert_eq!(local_path("//evil.example/"), None);
        assert_eq!(local_path("garbage"), None);
    }
}
