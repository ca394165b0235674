use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::users::AdminUpdateUserRequest,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    services::auth_service::UserRecord,
};

pub async fn list_users(pool: &DbPool, auth: &AuthUser) -> AppResult<Vec<User>> {
    ensure_admin(auth)?;
    let users: Vec<UserRecord> =
        sqlx::query_as("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;
    Ok(users.into_iter().map(UserRecord::into_user).collect())
}

pub async fn get_user(pool: &DbPool, auth: &AuthUser, id: Uuid) -> AppResult<User> {
    ensure_admin(auth)?;
    let user: Option<UserRecord> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    user.map(UserRecord::into_user).ok_or(AppError::NotFound)
}

pub async fn update_user(
    pool: &DbPool,
    auth: &AuthUser,
    id: Uuid,
    payload: AdminUpdateUserRequest,
) -> AppResult<User> {
    ensure_admin(auth)?;
    let existing: UserRecord = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let name = payload.name.unwrap_or(existing.name);
    let email = payload.email.unwrap_or(existing.email);
    let is_admin = payload.is_admin.unwrap_or(existing.is_admin);

    let user: UserRecord = sqlx::query_as(
        "UPDATE users SET name = $2, email = $3, is_admin = $4 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(is_admin)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(auth.user_id),
        "user_update",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(user.into_user())
}

pub async fn delete_user(pool: &DbPool, auth: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_admin(auth)?;
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(auth.user_id),
        "user_delete",
        Some("users"),
        Some(serde_json::json!({ "user_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}
