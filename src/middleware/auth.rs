use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth;
use crate::error::ApiError;

/// Router-layer employer gate applied to every `/api` route.
///
/// Resolves the session, enforces the employer role, and injects the vetted
/// [`auth::Principal`] into request extensions for handlers. This is the only
/// authorization gate in the service; there is deliberately no second copy at
/// the handler level.
pub async fn employer_gate(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let principal = auth::resolve_session(request.headers());
    let principal = auth::require_employer(principal)?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
