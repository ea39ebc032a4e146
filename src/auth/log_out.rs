//! The route for logging out.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Invalidate the auth cookie and redirect the client to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    (
        invalidate_auth_cookie(jar),
        Redirect::to(endpoints::LOG_IN_VIEW),
    )
        .into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{Router, routing::get};
    use axum_extra::extract::cookie::{Cookie, Key};
    use axum_test::TestServer;
    use sha2::Digest;
    use time::OffsetDateTime;

    use crate::{auth::COOKIE_TOKEN, endpoints};

    use super::get_log_out;

    #[tokio::test]
    async fn log_out_invalidates_cookie_and_redirects() {
        let hash = sha2::Sha512::digest("nafstenoas");
        let app = Router::new()
            .route(endpoints::LOG_OUT, get(get_log_out))
            .with_state(Key::from(&hash));
        let server = TestServer::new(app);

        let response = server
            .get(endpoints::LOG_OUT)
            .add_cookie(Cookie::build((COOKIE_TOKEN, "FOOBAR")).build())
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN_VIEW);

        // The cookie value on the wire is encrypted, so assert the removal
        // via the expiry instead.
        let token_cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(
            token_cookie.expires_datetime(),
            Some(OffsetDateTime::UNIX_EPOCH)
        );
    }
}
