use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use bloglist_core::{User, UserId};

use crate::app::errors::ApiError;

/// Authenticated identity for a request.
///
/// Attached by [`crate::middleware::user_extractor`] when a valid bearer token
/// was presented. Extracting it from a request without one fails with
/// [`ApiError::MissingToken`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    id: UserId,
    username: String,
    name: Option<String>,
}

impl CurrentUser {
    pub fn new(id: UserId, username: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id,
            username: username.into(),
            name,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.username.clone(), user.name.clone())
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ApiError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    #[test]
    fn built_from_user_without_credentials() {
        let user = User::new("root".to_string(), Some("Superuser".to_string()), "$2b$hash".to_string());
        let current = CurrentUser::from(&user);

        assert_eq!(current.id(), user.id);
        assert_eq!(current.username(), "root");
        assert_eq!(current.name(), Some("Superuser"));
        assert!(!format!("{current:?}").contains("$2b$hash"));
    }

    #[tokio::test]
    async fn missing_identity_is_rejected() {
        let (mut parts, _) = Request::new(()).into_parts();
        let err = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));

        let user = CurrentUser::new(UserId::new(), "root", None);
        parts.extensions.insert(user.clone());
        let extracted = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, user);
    }
}
