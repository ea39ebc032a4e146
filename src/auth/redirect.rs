//! Builds and validates the `redirect_url` query parameter that sends users
//! back to the page they wanted after logging in.

use axum::{extract::Request, http::Uri};
use tracing::{error, warn};

use crate::endpoints;

/// Whether `path_and_query` is a redirect target the log in flow will accept.
///
/// Only site relative paths are allowed, otherwise the parameter could be
/// used to bounce users to an attacker's site. Redirects back to the log in
/// page itself are also rejected so a stale parameter cannot trap users in a
/// log in loop.
fn is_allowed_target(path_and_query: &str) -> bool {
    if !path_and_query.starts_with('/') || path_and_query.starts_with("//") {
        return false;
    }

    let path = path_and_query
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(path_and_query);

    path != endpoints::LOG_IN_VIEW
}

fn allowed_path_and_query(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?.as_str();

    is_allowed_target(path_and_query).then(|| path_and_query.to_owned())
}

/// Parse `raw_url` as a redirect target, returning `None` if it is not a site
/// relative path.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    allowed_path_and_query(&uri)
}

/// Build the log in page URL that brings the user back to the page they were
/// on once they log in.
///
/// Page requests redirect back to the requested URI. Requests under `/api`
/// come from htmx, so the page to return to is taken from the HX-Current-URL
/// header instead.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let redirect_target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_headers(request)?
    } else {
        allowed_path_and_query(request.uri())?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

pub(super) fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn redirect_target_from_hx_headers(request: &Request) -> Option<String> {
    let headers = request.headers();
    let hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .map(|header| header.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if !hx_request {
        warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let current_url = match headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    {
        Some(value) => value,
        None => {
            warn!("Missing HX-Current-URL header for /api request.");
            return None;
        }
    };

    // HX-Current-URL is a full URL including the origin, so only the path and
    // query are kept.
    let uri = current_url.parse::<Uri>().ok()?;
    let redirect_url = allowed_path_and_query(&uri);

    if redirect_url.is_none() {
        warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}
