//! Signed session cookies.
//!
//! Token layout: `base64url(email).expires_unix.base64url(hmac_sha256)`,
//! where the MAC covers everything before the last dot.

use axum::http::{HeaderMap, header};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub expires_at: i64,
}

pub struct SessionKeys {
    secret: Vec<u8>,
    ttl_secs: i64,
    secure: bool,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
            secure: true,
        }
    }

    /// Whether cookies carry the `Secure` attribute (on by default).
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any length")
    }

    pub fn issue(&self, email: &str) -> String {
        self.issue_at(email, Utc::now())
    }

    fn issue_at(&self, email: &str, now: DateTime<Utc>) -> String {
        let expires_at = now.timestamp().saturating_add(self.ttl_secs);
        let payload = format!("{}.{}", URL_SAFE_NO_PAD.encode(email), expires_at);

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{payload}.{signature}")
    }

    pub fn verify(&self, token: &str) -> Option<Session> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let (payload, signature) = token.rsplit_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let (email, expires_at) = payload.split_once('.')?;
        let expires_at: i64 = expires_at.parse().ok()?;
        if expires_at <= now.timestamp() {
            return None;
        }
        let email = String::from_utf8(URL_SAFE_NO_PAD.decode(email).ok()?).ok()?;

        Some(Session { email, expires_at })
    }

    pub fn set_cookie(&self, token: &str) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
            self.ttl_secs
        )
    }

    pub fn clear_cookie() -> String {
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }

    /// Session carried by the request's cookies, if any is valid.
    pub fn from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
            .find_map(|token| self.verify(token))
    }
}
