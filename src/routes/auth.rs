//! Authentication bootstrap endpoints
//!
//! The portal loads two small scripts before the SPA boots. Serving them
//! same-origin keeps them inside the `script-src 'self'` policy.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

use super::synthesized::SyntheticRequest;

/// Redirects to the identity provider when there is no session, otherwise
/// lets the SPA boot.
pub const PORTAL_LOAD_JS: &str = r#"(function () {
  var token = window.localStorage.getItem('sandbox-access-token');
  if (token) {
    return;
  }
  fetch('/api/auth/login/status', { credentials: 'include' })
    .then(function (res) { return res.json(); })
    .then(function (status) {
      if (!status || !status.authenticated) {
        window.location.href = '/api/auth/login';
      }
    })
    .catch(function () {
      window.location.href = '/api/auth/login';
    });
})();
"#;

/// Moves the access token handed back by the login callback from the query
/// string into local storage and cleans the URL.
pub const SEARCH_PARAM_JS: &str = r#"(function () {
  var params = new URLSearchParams(window.location.search);
  var token = params.get('token');
  if (!token) {
    return;
  }
  window.localStorage.setItem('sandbox-access-token', token);
  params.delete('token');
  var query = params.toString();
  var url = window.location.pathname + (query ? '?' + query : '') + window.location.hash;
  window.history.replaceState(null, '', url);
})();
"#;

pub const AUTH_HELPER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Sandbox authentication helper</title>
</head>
<body>
  <h1>Sandbox authentication</h1>
  <p>Sign-in is handled by the backend API through the identity provider.</p>
  <ul>
    <li><a href="/api/auth/login">/api/auth/login</a> starts the sign-in flow.</li>
    <li><code>/api/auth/login/callback</code> receives the identity provider response.</li>
    <li><code>/api/auth/login/status</code> reports whether the current session is signed in.</li>
    <li><a href="/api/auth/logout">/api/auth/logout</a> ends the session.</li>
  </ul>
  <p>Bootstrap scripts: <code>/api/auth/portalLoad.js</code>, <code>/api/auth/searchParam.js</code>.</p>
  <p>Liveness: <a href="/health">/health</a>. Diagnostics: <a href="/debug">/debug</a>.</p>
</body>
</html>
"#;

fn javascript(body: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

/// GET /api/auth/portalLoad.js
pub fn portal_load_script(_: &SyntheticRequest<'_>) -> Response {
    javascript(PORTAL_LOAD_JS)
}

/// GET /api/auth/searchParam.js
pub fn search_param_script(_: &SyntheticRequest<'_>) -> Response {
    javascript(SEARCH_PARAM_JS)
}

/// GET /auth-helper
pub fn helper_page(_: &SyntheticRequest<'_>) -> Response {
    Html(AUTH_HELPER_HTML).into_response()
}
