//! Authorization guards for session credential validation
//!
//! Both guards finish verifying the credential before deciding anything, so
//! an invalid token never reaches the ownership comparison or the handler.

use std::time::Duration;

use axum::{
    extract::{Path, Request, State},
    http::{HeaderValue, Method, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::{error::ApiError, jwt::Identity, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        AuthUser {
            email: identity.email,
        }
    }
}

/// Verify the session cookie and return the identity it carries
fn authenticate(state: &AppState, jar: &CookieJar) -> Result<AuthUser, ApiError> {
    let token = state.cookies.credential(jar).ok_or_else(|| {
        info!("Request without session credential");
        ApiError::Unauthorized
    })?;

    let identity = state.tokens.verify(token).map_err(|e| {
        warn!("Failed to validate credential: {}", e);
        ApiError::Unauthorized
    })?;

    Ok(identity.into())
}

/// Require a valid session credential
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, &jar)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Require a valid session credential whose email matches the `:email`
/// path parameter
pub async fn require_owner(
    State(state): State<AppState>,
    Path(email): Path<String>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, &jar)?;

    if user.email != email {
        warn!(
            "Credential for {} used to access resources of {}",
            user.email, email
        );
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Create the CORS layer
///
/// Explicit origins may send the session cookie. A `*` entry opens the API
/// to any origin, which browsers only allow without credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_methods(allowed_methods)
            .allow_headers(Any)
            .allow_origin(Any)
            .max_age(Duration::from_secs(600));
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods(allowed_methods)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .allow_credentials(true)
        .allow_origin(origins)
        .max_age(Duration::from_secs(600))
}
