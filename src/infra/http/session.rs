//! Signed-cookie session holding the logged-in user id.

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use sha2::{Digest, Sha512};

pub const SESSION_COOKIE: &str = "storefront_session";

/// Derive the cookie signing key from the configured secret.
pub fn session_key(secret: &str) -> Key {
    let mut hasher = Sha512::new();
    hasher.update(secret.as_bytes());
    let digest = hasher.finalize();
    Key::from(digest.as_slice())
}

/// User id bound to the session, if the cookie is present and untampered.
pub fn session_user_id(jar: &SignedCookieJar) -> Option<i64> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

pub fn bind_user(jar: SignedCookieJar, user_id: i64) -> SignedCookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, user_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

pub fn clear(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
