//! Identity sync: mirror the identity provider's profile locally

use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{User, UserProfile};
use shared::util::now_millis;
use validator::Validate;

use crate::error::{ShopError, ShopResult};
use crate::store::UserStore;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SyncUserRequest {
    #[serde(default)]
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

pub async fn sync_user<S>(
    store: &S,
    user_id: &str,
    mut request: SyncUserRequest,
) -> ShopResult<User>
where
    S: UserStore + ?Sized,
{
    // 先去掉首尾空白再校验格式
    request.email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);
    let Some(email) = request.email.clone() else {
        return Err(ShopError::Validation(
            ErrorCode::EmailRequired,
            ErrorCode::EmailRequired.message().into(),
        ));
    };
    request.validate()?;

    let profile = UserProfile {
        email,
        first_name: request.first_name,
        last_name: request.last_name,
        username: request.username,
    };
    let user = store.upsert_user(user_id, &profile, now_millis()).await?;
    tracing::info!(user_id = %user_id, "User synced");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn request(email: Option<&str>) -> SyncUserRequest {
        SyncUserRequest {
            email: email.map(str::to_string),
            first_name: Some("Ada".into()),
            last_name: None,
            username: None,
        }
    }

    #[tokio::test]
    async fn test_email_is_trimmed_before_validation() {
        let store = MemoryStore::new();

        let user = sync_user(&store, "user_1", request(Some("  ada@example.com "))).await.unwrap();

        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_missing_or_blank_email_is_required() {
        let store = MemoryStore::new();

        for email in [None, Some(""), Some("   ")] {
            let err = sync_user(&store, "user_1", request(email)).await.unwrap_err();
            assert!(
                matches!(err, ShopError::Validation(ErrorCode::EmailRequired, _)),
                "{email:?}"
            );
        }
        assert_eq!(store.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_email_fails_validation() {
        let store = MemoryStore::new();
        let err = sync_user(&store, "user_1", request(Some("not-an-email")))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Validation(ErrorCode::ValidationFailed, _)));
    }
}
