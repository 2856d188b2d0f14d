//! Request extractors: the signed-in caller, plus JSON/path/query wrappers
//! whose rejections go through [`Error`] like every other failure.
//!
//! Authentication happens at the edge (the auth provider's proxy). It forwards
//! the verified identity in `x-user-id`, `x-user-role` and, optionally,
//! `x-user-name`.

use crate::{
    core::access::{Actor, Role},
    errors::Error,
};
use axum::{
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};
use std::str::FromStr;
use tracing::debug;

/// Header carrying the auth-provider user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the role (`admin`, `owner` or `customer`).
pub const USER_ROLE_HEADER: &str = "x-user-role";
/// Header carrying the display name.
pub const USER_NAME_HEADER: &str = "x-user-name";

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn actor_from_parts(parts: &Parts) -> Result<Option<Actor>, Error> {
    let Some(user_id) = header(parts, USER_ID_HEADER) else {
        return Ok(None);
    };
    let role = header(parts, USER_ROLE_HEADER)
        .map(Role::from_str)
        .transpose()?
        .unwrap_or(Role::Customer);
    let mut actor = Actor::new(user_id, role);
    actor.name = header(parts, USER_NAME_HEADER).map(str::to_string);
    Ok(Some(actor))
}

/// Requires a signed-in caller.
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Self>() {
            return Ok(actor.clone());
        }
        match actor_from_parts(parts)? {
            Some(actor) => {
                parts.extensions.insert(actor.clone());
                Ok(actor)
            }
            None => {
                debug!(uri = %parts.uri, "sign-in required");
                Err(Error::Unauthorized)
            }
        }
    }
}

/// JSON request body. Malformed bodies answer with the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Path parameters. Unparseable segments answer with the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);

/// Query string. Bad parameters answer with the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        debug!(reason = %rejection.body_text(), "rejected JSON body");
        Self::validation("body", "بيانات الطلب غير صالحة")
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        debug!(reason = %rejection.body_text(), "rejected path parameters");
        Self::validation("path", "الرابط المطلوب غير صالح")
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        debug!(reason = %rejection.body_text(), "rejected query string");
        Self::validation("query", "معايير البحث غير صالحة")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/favorites");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_actor_from_headers() {
        let mut p = parts(&[
            (USER_ID_HEADER, "user_42"),
            (USER_ROLE_HEADER, "Owner"),
            (USER_NAME_HEADER, "Lina"),
        ]);
        let actor = Actor::from_request_parts(&mut p, &()).await.unwrap();
        assert_eq!(actor.user_id, "user_42");
        assert_eq!(actor.role, Role::Owner);
        assert_eq!(actor.name.as_deref(), Some("Lina"));
    }

    #[tokio::test]
    async fn test_missing_identity() {
        let mut p = parts(&[]);
        let result = Actor::from_request_parts(&mut p, &()).await;
        assert!(matches!(result, Err(Error::Unauthorized)));
    }

    #[tokio::test]
    async fn test_bad_path_becomes_validation_error() {
        let mut p = parts(&[]);
        let result = PathParam::<i64>::from_request_parts(&mut p, &()).await;
        // No matched route, so axum reports missing path params
        assert!(matches!(result, Err(Error::Validation { field: "path", .. })));
    }

    #[tokio::test]
    async fn test_role_defaults_and_rejects_unknown() {
        let mut p = parts(&[(USER_ID_HEADER, "u1")]);
        let actor = Actor::from_request_parts(&mut p, &()).await.unwrap();
        assert_eq!(actor.role, Role::Customer);

        let mut p = parts(&[(USER_ID_HEADER, "u1"), (USER_ROLE_HEADER, "root")]);
        let result = Actor::from_request_parts(&mut p, &()).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));
    }
}
