//! Session cookie management
//!
//! The session credential travels in an HTTP-only cookie. Production
//! deployments serve the front-end from another site, so the cookie must be
//! `Secure; SameSite=None` there; development keeps it `SameSite=Strict`.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::config::Environment;

/// Name of the cookie carrying the session credential
pub const SESSION_COOKIE_NAME: &str = "token";

/// Builds and reads the session cookie
#[derive(Debug, Clone, Copy)]
pub struct SessionCookies {
    environment: Environment,
    max_age_secs: u64,
}

impl SessionCookies {
    /// Create a cookie policy for an environment and credential lifetime
    pub fn new(environment: Environment, max_age_secs: u64) -> Self {
        Self {
            environment,
            max_age_secs,
        }
    }

    fn secure(&self) -> bool {
        self.environment == Environment::Production
    }

    fn same_site(&self) -> SameSite {
        match self.environment {
            Environment::Production => SameSite::None,
            Environment::Development => SameSite::Strict,
        }
    }

    fn build(&self, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, value))
            .path("/")
            .http_only(true)
            .secure(self.secure())
            .same_site(self.same_site())
            .max_age(max_age)
            .build()
    }

    /// Cookie carrying a freshly issued credential
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        let max_age = i64::try_from(self.max_age_secs).unwrap_or(i64::MAX);
        self.build(token, Duration::seconds(max_age))
    }

    /// Cookie instructing the client to discard its credential
    pub fn removal_cookie(&self) -> Cookie<'static> {
        self.build(String::new(), Duration::ZERO)
    }

    /// Add the session cookie to the response jar
    pub fn grant(&self, jar: CookieJar, token: String) -> CookieJar {
        jar.add(self.session_cookie(token))
    }

    /// Replace the session cookie with an expired, empty one
    pub fn revoke(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.removal_cookie())
    }

    /// Read the credential from the request cookies, if present
    pub fn credential<'a>(&self, jar: &'a CookieJar) -> Option<&'a str> {
        jar.get(SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
    }
}
