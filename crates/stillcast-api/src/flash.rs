//! One-shot flash messages over signed cookies.
//!
//! The message survives exactly one redirect: set on the failure response,
//! read and cleared when the form is rendered next.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};

const FLASH_COOKIE: &str = "stillcast_flash";

/// Redirect back to the form carrying a flash message.
pub fn redirect_with_flash(jar: SignedCookieJar, message: &str) -> Response {
    let cookie = Cookie::build((FLASH_COOKIE, message.to_string()))
        .path("/")
        .http_only(true)
        .build();

    (jar.add(cookie), Redirect::to("/")).into_response()
}

/// Take the pending flash message, clearing its cookie.
pub fn take_flash(jar: SignedCookieJar) -> (SignedCookieJar, Option<String>) {
    let message = jar.get(FLASH_COOKIE).map(|c| c.value().to_string());
    let jar = if message.is_some() {
        jar.remove(Cookie::build(FLASH_COOKIE).path("/").build())
    } else {
        jar
    };
    (jar, message)
}
