//! Requesting identity from headers set by the upstream authentication layer.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::model::{Role, User};

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Any authenticated caller. Rejects with 401 when `X-User-Id` is missing.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Not authorized to access this route".into()))?;
        let role = header(parts, USER_ROLE_HEADER).map(Role::parse).unwrap_or(Role::User);
        Ok(CurrentUser(User {
            id: id.to_string(),
            role,
        }))
    }
}

/// An authenticated caller with the admin role; others get 403.
#[derive(Clone, Debug)]
pub struct AdminUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden(format!(
                "User role {} is not authorized to access this route",
                user.role.as_str()
            )));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(headers: &[(&str, &str)]) -> Result<AdminUser, AppError> {
        let mut req = Request::builder();
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        let (mut parts, _) = req.body(()).unwrap().into_parts();
        AdminUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn roles_gate_admin_routes() {
        assert!(matches!(extract(&[]).await, Err(AppError::Unauthorized(_))));
        assert!(matches!(
            extract(&[(USER_ID_HEADER, "u1")]).await,
            Err(AppError::Forbidden(_))
        ));
        let AdminUser(user) = extract(&[(USER_ID_HEADER, " root "), (USER_ROLE_HEADER, "admin")])
            .await
            .unwrap();
        assert_eq!(user.id, "root");
    }
}
