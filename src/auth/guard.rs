//! Session guard for the admin API.
//!
//! Two credential shapes are supported, chosen by `SESSION_MODE`:
//! - `token`: an HS256 JWT in the `token` cookie; a valid signature is enough.
//! - `claim`: the admin identity in the signed `admin_session` cookie, which
//!   must also be present in the store's admin allow-list.

use std::convert::Infallible;
use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, CookieJar, Key, SameSite, SignedCookieJar};
use sha2::{Digest, Sha512};
use thiserror::Error;
use tracing::{debug, warn};

use super::{generate_jwt, validate_jwt, Claims, JwtError};
use crate::config::{SecurityConfig, SessionMode, MAX_SESSION_TTL_SECS};
use crate::database::models::Admin;
use crate::database::{ContentStore, StoreError};
use crate::middleware::AuthUser;

pub const TOKEN_COOKIE: &str = "token";
pub const CLAIM_COOKIE: &str = "admin_session";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Access denied")]
    MissingCredential,

    #[error("Invalid token")]
    InvalidCredential,

    #[error("Forbidden")]
    NotAdmin,

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cookies written on login/logout. Claim-mode cookies are signed by the jar.
pub enum SessionCookies {
    Plain(CookieJar),
    Signed(SignedCookieJar),
}

impl IntoResponseParts for SessionCookies {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        match self {
            SessionCookies::Plain(jar) => jar.into_response_parts(res),
            SessionCookies::Signed(jar) => jar.into_response_parts(res),
        }
    }
}

#[derive(Clone)]
pub struct SessionGuard {
    mode: SessionMode,
    secret: String,
    key: Key,
    ttl_secs: u64,
    cookie_secure: bool,
    store: Arc<dyn ContentStore>,
}

impl SessionGuard {
    pub fn new(security: &SecurityConfig, store: Arc<dyn ContentStore>) -> Self {
        // Key::from needs 64 bytes of key material
        let digest = Sha512::digest(security.jwt_secret.as_bytes());

        Self {
            mode: security.session_mode,
            secret: security.jwt_secret.clone(),
            key: Key::from(&digest[..]),
            ttl_secs: security.session_ttl_secs.min(MAX_SESSION_TTL_SECS),
            cookie_secure: security.cookie_secure,
            store,
        }
    }

    /// Resolve the request's credential to an admin identity.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        match self.mode {
            SessionMode::Token => self.authenticate_token(headers),
            SessionMode::Claim => self.authenticate_claim(headers).await,
        }
    }

    fn authenticate_token(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let jar = CookieJar::from_headers(headers);
        let token = jar
            .get(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let claims = validate_jwt(&token, &self.secret).map_err(|e| {
            debug!("Rejected session token: {}", e);
            AuthError::InvalidCredential
        })?;

        Ok(AuthUser {
            id: claims.id,
            username: claims.username,
        })
    }

    async fn authenticate_claim(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let signed = SignedCookieJar::from_headers(headers, self.key.clone());
        let identity = match signed.get(CLAIM_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None if CookieJar::from_headers(headers).get(CLAIM_COOKIE).is_some() => {
                warn!("Rejected admin_session cookie with a bad signature");
                return Err(AuthError::InvalidCredential);
            }
            None => return Err(AuthError::MissingCredential),
        };

        let admin = self.store.find_admin(&identity).await?.ok_or_else(|| {
            warn!("Session identity '{}' is not in the admin allow-list", identity);
            AuthError::NotAdmin
        })?;

        Ok(AuthUser::from(admin))
    }

    /// Cookies that establish a session for `admin`.
    pub fn issue(&self, admin: &Admin) -> Result<SessionCookies, AuthError> {
        match self.mode {
            SessionMode::Token => {
                let claims = Claims::new(admin.id.to_string(), admin.username.clone(), self.ttl_secs);
                let token = generate_jwt(&claims, &self.secret)?;
                Ok(SessionCookies::Plain(CookieJar::new().add(self.cookie(TOKEN_COOKIE, token))))
            }
            SessionMode::Claim => {
                let cookie = self.cookie(CLAIM_COOKIE, admin.username.clone());
                Ok(SessionCookies::Signed(SignedCookieJar::new(self.key.clone()).add(cookie)))
            }
        }
    }

    /// Cookies that end any session, whichever mode issued it.
    pub fn clear(&self) -> SessionCookies {
        let mut jar = CookieJar::new();
        for name in [TOKEN_COOKIE, CLAIM_COOKIE] {
            let mut cookie = self.cookie(name, String::new());
            cookie.make_removal();
            jar = jar.add(cookie);
        }
        SessionCookies::Plain(jar)
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.cookie_secure)
            .max_age(time::Duration::seconds(self.ttl_secs as i64))
            .build()
    }
}

impl From<Admin> for AuthUser {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id.to_string(),
            username: admin.username,
        }
    }
}
