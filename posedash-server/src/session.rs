//! The `token` cookie: an HS256 JWT naming the user, wrapped in an HMAC-signed cookie.

use axum::{
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    response::Response,
};
use chrono::Utc;
use cookie::{Cookie, CookieJar, Key, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha512};
use tracing::{debug, trace};

pub const TOKEN_COOKIE_NAME: &str = "token";
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("failed to sign session token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("session cookie is not a valid header: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
    #[error("signed cookie jar lost the session cookie")]
    Signing,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Derives the 64-byte cookie signing key from a secret of any length.
pub fn cookie_key(secret: &str) -> Key {
    Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}

pub fn create_token(username: &str, encoding_key: &EncodingKey) -> Result<String, SessionError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        username: username.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };
    let token = encode(&Header::new(Algorithm::HS256), &claims, encoding_key)?;
    trace!(username, exp = claims.exp, "Created session JWT");
    Ok(token)
}

pub fn decode_token(token: &str, decoding_key: &DecodingKey) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 30;
    match decode::<Claims>(token, decoding_key, &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            debug!(error = %e, "Session JWT verification failed");
            None
        }
    }
}

fn base_cookie(value: String, secure: bool) -> cookie::CookieBuilder<'static> {
    Cookie::build((TOKEN_COOKIE_NAME, value))
        .http_only(true)
        .path("/")
        .secure(secure)
        .same_site(if secure { SameSite::None } else { SameSite::Strict })
}

/// A `token` cookie carrying `jwt`, signed with `key`.
pub fn signed_cookie(jwt: String, key: &Key, secure: bool) -> Result<Cookie<'static>, SessionError> {
    let mut jar = CookieJar::new();
    jar.signed_mut(key)
        .add(base_cookie(jwt, secure).max_age(time::Duration::seconds(SESSION_TTL_SECS)));
    jar.get(TOKEN_COOKIE_NAME).cloned().ok_or(SessionError::Signing)
}

/// A cookie telling the browser to drop `token`.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = base_cookie(String::new(), secure).build();
    cookie.make_removal();
    cookie
}

/// The JWT from the request's `token` cookie, if present and correctly signed.
pub fn read_token(headers: &HeaderMap, key: &Key) -> Option<String> {
    let mut jar = CookieJar::new();
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .filter(|c| c.name() == TOKEN_COOKIE_NAME)
        .for_each(|c| jar.add_original(c.into_owned()));

    jar.get(TOKEN_COOKIE_NAME)?;
    let verified = jar.signed(key).get(TOKEN_COOKIE_NAME);
    if verified.is_none() {
        debug!("Ignoring session cookie with a bad signature");
    }
    verified.map(|c| c.value().to_string())
}

pub fn append_cookie(response: &mut Response, cookie: &Cookie<'_>) -> Result<(), SessionError> {
    let value = HeaderValue::from_str(&cookie.to_string())?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(())
}

/// Whether a handler already set or cleared the `token` cookie on this response.
pub fn sets_token(response: &Response) -> bool {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value).ok())
        .any(|c| c.name() == TOKEN_COOKIE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> (EncodingKey, DecodingKey) {
        (EncodingKey::from_secret(b"secret"), DecodingKey::from_secret(b"secret"))
    }

    fn request_with(cookie: &Cookie<'_>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let pair = format!("{}={}", cookie.name(), cookie.value());
        headers.insert(COOKIE, HeaderValue::from_str(&pair).unwrap());
        headers
    }

    #[test]
    fn test_token_round_trip() {
        let (encoding, decoding) = keys();
        let token = create_token("ana", &encoding).unwrap();

        let claims = decode_token(&token, &decoding).unwrap();
        assert_eq!(claims.username, "ana");
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_SECS);
    }

    #[test]
    fn test_token_from_another_secret_is_rejected() {
        let token = create_token("ana", &EncodingKey::from_secret(b"other")).unwrap();
        assert!(decode_token(&token, &keys().1).is_none());
    }

    #[test]
    fn test_signed_cookie_is_read_back() {
        let key = cookie_key("cookie-secret");
        let cookie = signed_cookie("jwt-value".into(), &key, false).unwrap();

        assert_ne!(cookie.value(), "jwt-value");
        assert!(cookie.http_only().unwrap_or(false));
        assert_eq!(read_token(&request_with(&cookie), &key).as_deref(), Some("jwt-value"));
    }

    #[test]
    fn test_tampered_or_foreign_cookie_is_ignored() {
        let key = cookie_key("cookie-secret");
        let cookie = signed_cookie("jwt-value".into(), &cookie_key("another-secret"), false).unwrap();
        assert_eq!(read_token(&request_with(&cookie), &key), None);

        let unsigned = Cookie::new(TOKEN_COOKIE_NAME, "jwt-value");
        assert_eq!(read_token(&request_with(&unsigned), &key), None);
        assert_eq!(read_token(&HeaderMap::new(), &key), None);
    }

    #[test]
    fn test_removal_cookie_expires() {
        let cookie = removal_cookie(false);
        assert_eq!(cookie.name(), TOKEN_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
