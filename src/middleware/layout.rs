use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::AuthContext;
use crate::state::AppState;

/// Value of the named cookie across every `Cookie` header. An empty value
/// counts as absent.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Dashboard layout: seeds an [`AuthContext`] from the auth cookie on every
/// request. Presence only decides whether resolution is attempted; requests
/// are never rejected here.
pub async fn auth_layout_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let cookie_name = &state.config.security.auth_cookie_name;
    let token = read_cookie(request.headers(), cookie_name).map(str::to_string);

    let context = AuthContext::establish(token.as_deref(), &state.resolver).await;
    debug!(
        has_token = context.has_token,
        state = context.state.name(),
        "auth context established"
    );

    request.extensions_mut().insert(context);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(header::COOKIE, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_reads_named_cookie() {
        let headers = headers(&["theme=dark; token=abc.def; lang=en"]);
        assert_eq!(read_cookie(&headers, "token"), Some("abc.def"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_searches_every_cookie_header() {
        let headers = headers(&["theme=dark", "token=xyz"]);
        assert_eq!(read_cookie(&headers, "token"), Some("xyz"));
    }

    #[test]
    fn test_empty_or_prefixed_names_do_not_match() {
        assert_eq!(read_cookie(&headers(&["token="]), "token"), None);
        assert_eq!(read_cookie(&headers(&["xtoken=1"]), "token"), None);
        assert_eq!(read_cookie(&HeaderMap::new(), "token"), None);
    }
}
