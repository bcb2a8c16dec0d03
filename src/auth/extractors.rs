use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use tracing::warn;

use crate::auth::claims::Subject;
use crate::error::ApiError;
use crate::state::AppState;

/// Extracts the verified caller from the `Authorization: Bearer` header.
#[derive(Debug)]
pub struct AuthUser(pub Subject);

fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header"))?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or(ApiError::Unauthorized("Invalid auth scheme"))?;
    Ok(Some(token))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(parts)?.ok_or(ApiError::Unauthorized("Missing Authorization header"))?;

        let claims = state.verifier.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser(claims.into()))
    }
}

/// Like [`AuthUser`] but tolerates anonymous callers: no header yields
/// `None`, while a present-but-invalid credential is still rejected.
#[derive(Debug)]
pub struct MaybeAuthUser(pub Option<Subject>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            return Ok(MaybeAuthUser(None));
        };

        let claims = state.verifier.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthorized("Invalid or expired token")
        })?;

        Ok(MaybeAuthUser(Some(claims.into())))
    }
}
