//! Bearer token middleware for guests and organizers
//!
//! Each middleware resolves the token to an identity and stores it in the
//! request extensions, where handlers pick it up with `Extension`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::error::ServiceError;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// A guest holding a valid session
#[derive(Debug, Clone)]
pub struct GuestIdentity {
    pub session_id: Uuid,
    pub event_id: Uuid,
    pub guest_name: String,
}

/// The organizer behind an owner token, scoped to the event it was issued for
#[derive(Debug, Clone)]
pub struct OwnerIdentity {
    pub event_id: Uuid,
    pub owner_token: String,
}

fn bearer_token(
    header: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<String, ApiError> {
    header
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))
}

/// Any failure resolving a token is reported as 401
fn reject(err: ServiceError) -> ApiError {
    match err {
        ServiceError::Unauthorized(msg) | ServiceError::NotFound(msg) => {
            debug!(reason = %msg, "Rejected bearer token");
            ApiError::Unauthorized(msg)
        }
        other => {
            error!(error = %other, "Failed to resolve bearer token");
            ApiError::Unauthorized("unable to verify token".to_string())
        }
    }
}

/// Require a valid guest session
pub async fn guest_auth(
    State(state): State<AppState>,
    header: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(header)?;

    let session = state
        .session_service
        .validate_session(&token)
        .await
        .map_err(reject)?;

    req.extensions_mut().insert(GuestIdentity {
        session_id: session.id,
        event_id: session.event_id,
        guest_name: session.guest_name,
    });

    Ok(next.run(req).await)
}

/// Require an organizer's owner token
pub async fn owner_auth(
    State(state): State<AppState>,
    header: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(header)?;

    let event = state
        .event_service
        .get_by_owner_token(&token)
        .await
        .map_err(reject)?;

    req.extensions_mut().insert(OwnerIdentity {
        event_id: event.id,
        owner_token: token,
    });

    Ok(next.run(req).await)
}
