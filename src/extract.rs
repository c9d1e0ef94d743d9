use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// Organization scope for the request, carried in the `X-Org-Id` header.
/// Tenant resolution (sessions, API keys) is a collaborator outside this
/// engine; the engine only needs the resolved id.
#[derive(Debug, Clone, Copy)]
pub struct OrgId(pub Uuid);

impl<S> FromRequestParts<S> for OrgId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-org-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::BadRequest("Missing X-Org-Id header".to_string()))?;

        let org_id = raw
            .parse::<Uuid>()
            .map_err(|_| AppError::BadRequest("X-Org-Id must be a UUID".to_string()))?;

        Ok(OrgId(org_id))
    }
}
