//! Authentication middleware and extractor for axum.
//!
//! ```text
//! Request → auth_middleware → injects Auth into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```
//!
//! The session token travels in the `Authorization` header, either raw or
//! with a `Bearer ` prefix. A token that resolves to no user leaves the
//! request unauthenticated; routes that need a caller use `RequireAuth` and
//! answer 401.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{handle_use_case_error, ErrorResponse};
use crate::application::models::{Auth, VerifyUserRequest};
use crate::application::{UseCaseError, UserUseCase};

/// Auth middleware state.
pub type AuthState = Arc<UserUseCase>;

fn session_token(request: &Request) -> Option<String> {
    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Resolves the session token through `UserUseCase::verify`.
///
/// A store failure answers 500; any other failure continues without a caller.
pub async fn auth_middleware(
    State(users): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = session_token(&request) {
        match users.verify(VerifyUserRequest { token }).await {
            Ok(auth) => {
                request.extensions_mut().insert(auth);
            }
            Err(e @ UseCaseError::Persistence(_)) => return handle_use_case_error(e),
            Err(e) => tracing::debug!(error = %e, "Rejected session token"),
        }
    }

    next.run(request).await
}

/// Extractor that requires an authenticated caller.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Auth);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<Auth>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

#[derive(Debug, Clone)]
pub enum AuthRejection {
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Unauthorized")),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(header: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/contacts");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn token_is_read_raw_or_bearer_prefixed() {
        assert_eq!(session_token(&request_with(Some("abc"))), Some("abc".to_string()));
        assert_eq!(
            session_token(&request_with(Some("Bearer abc"))),
            Some("abc".to_string())
        );
    }

    #[test]
    fn missing_or_blank_header_has_no_token() {
        assert_eq!(session_token(&request_with(None)), None);
        assert_eq!(session_token(&request_with(Some("Bearer  "))), None);
    }

    #[test]
    fn unauthenticated_rejection_is_401() {
        let response = AuthRejection::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
