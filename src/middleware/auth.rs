use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{Claims, JwtKeys};
use crate::error::ApiError;
use crate::state::AppState;

/// Verified token holder
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

/// Per-request identity attached by [`identity_middleware`]. Reads ignore it;
/// writes may require `Identified`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Unauthenticated,
    Identified(Principal),
}

impl Identity {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Identity::Identified(principal) => Some(principal),
            Identity::Unauthenticated => None,
        }
    }

    pub fn subject(&self) -> Option<&str> {
        self.principal().map(|p| p.subject.as_str())
    }

    /// Escalate "no verified identity" into a 401
    pub fn require(&self) -> Result<&Principal, ApiError> {
        self.principal()
            .ok_or_else(|| ApiError::unauthorized("A valid bearer token is required for this operation"))
    }
}

/// Decode the bearer token, if any. Never fails: a missing, malformed or
/// unverifiable token all yield `Unauthenticated`.
pub fn identify(headers: &HeaderMap, keys: &JwtKeys) -> Identity {
    let token = match extract_bearer_token(headers) {
        Ok(token) => token,
        Err(reason) => {
            tracing::trace!("No identity: {}", reason);
            return Identity::Unauthenticated;
        }
    };

    match keys.verify(token) {
        Ok(claims) => Identity::Identified(Principal::from(claims)),
        Err(e) => {
            tracing::debug!("Ignoring bearer token: {}", e);
            Identity::Unauthenticated
        }
    }
}

/// Attach an [`Identity`] to every request; never rejects
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = identify(request.headers(), &state.keys);
    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let (scheme, token) = auth_str
        .trim()
        .split_once(' ')
        .ok_or("Authorization header must use Bearer token format")?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("Authorization header must use Bearer token format");
    }

    let token = token.trim();
    if token.is_empty() {
        return Err("Empty JWT token");
    }
    Ok(token)
}
