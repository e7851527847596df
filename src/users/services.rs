use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::users::dto::{CreateUserBody, PatchUserBody};
use crate::users::repo_types::{NewUser, User};

pub async fn create_user(st: &AppState, body: CreateUserBody) -> AppResult<User> {
    let (name, email) = body.validate()?;

    if st.users.find_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict(format!(
            "Email {email} is already registered"
        )));
    }

    let user = st.users.create(NewUser { name, email }).await?;
    info!(user_id = user.id, "user created");
    Ok(user)
}

pub async fn update_user(st: &AppState, id: i64, body: PatchUserBody) -> AppResult<User> {
    let (name, email) = body.validate()?;
    let mut user = get_user(st, id).await?;

    if let Some(email) = email {
        if let Some(holder) = st.users.find_by_email(&email).await? {
            if holder.id != id {
                warn!(user_id = id, %email, "email taken by another user");
                return Err(AppError::Conflict(format!(
                    "Email {email} is already registered"
                )));
            }
        }
        user.email = email;
    }
    if let Some(name) = name {
        user.name = name;
    }

    let user = st.users.update(&user).await?;
    info!(user_id = user.id, "user updated");
    Ok(user)
}

pub async fn get_user(st: &AppState, id: i64) -> AppResult<User> {
    st.users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {id} not found")))
}

pub async fn list_users(st: &AppState) -> AppResult<Vec<User>> {
    st.users.list().await
}

pub async fn delete_user(st: &AppState, id: i64) -> AppResult<()> {
    if id <= 0 {
        return Err(AppError::Validation(format!(
            "User id must be positive, got {id}"
        )));
    }
    st.users.delete(id).await?;
    info!(user_id = id, "user deleted");
    Ok(())
}

/// `NotFound` unless the user exists.
pub async fn ensure_exists(st: &AppState, id: i64) -> AppResult<()> {
    get_user(st, id).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body, fixed_state};

    #[tokio::test]
    async fn create_then_fetch_round_trips() {
        let (st, _) = fixed_state();
        let created = create_user(&st, body("John Doe", "john@example.com")).await.unwrap();
        let fetched = get_user(&st, created.id).await.unwrap();
        assert_eq!(fetched.name, "John Doe");
        assert_eq!(fetched.email, "john@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let (st, _) = fixed_state();
        create_user(&st, body("A", "a@example.com")).await.unwrap();
        let err = create_user(&st, body("B", "a@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn malformed_email_is_a_validation_error() {
        let (st, _) = fixed_state();
        let err = create_user(&st, body("A", "not-an-email")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_merges_only_present_fields() {
        let (st, _) = fixed_state();
        let user = create_user(&st, body("A", "a@example.com")).await.unwrap();
        let patch = PatchUserBody {
            name: Some("Alice".into()),
            email: None,
        };
        let updated = update_user(&st, user.id, patch).await.unwrap();
        assert_eq!(updated.name, "Alice");
        assert_eq!(updated.email, "a@example.com");
    }

    #[tokio::test]
    async fn update_to_foreign_email_is_rejected_and_leaves_record() {
        let (st, _) = fixed_state();
        let a = create_user(&st, body("A", "a@example.com")).await.unwrap();
        create_user(&st, body("B", "b@example.com")).await.unwrap();
        let patch = PatchUserBody {
            name: Some("Changed".into()),
            email: Some("b@example.com".into()),
        };
        let err = update_user(&st, a.id, patch).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(get_user(&st, a.id).await.unwrap(), a);
    }

    #[tokio::test]
    async fn update_keeping_own_email_is_fine() {
        let (st, _) = fixed_state();
        let a = create_user(&st, body("A", "a@example.com")).await.unwrap();
        let patch = PatchUserBody {
            name: None,
            email: Some("a@example.com".into()),
        };
        assert!(update_user(&st, a.id, patch).await.is_ok());
    }

    #[tokio::test]
    async fn update_unknown_user_is_not_found() {
        let (st, _) = fixed_state();
        let err = update_user(&st, 99, PatchUserBody::default()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent_but_rejects_non_positive_ids() {
        let (st, _) = fixed_state();
        let a = create_user(&st, body("A", "a@example.com")).await.unwrap();
        delete_user(&st, a.id).await.unwrap();
        delete_user(&st, a.id).await.unwrap();
        assert!(matches!(get_user(&st, a.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(delete_user(&st, 0).await, Err(AppError::Validation(_))));
    }
}
