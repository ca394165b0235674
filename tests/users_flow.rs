use storefront_api::{
    db::{DbPool, create_orm_conn, create_pool, run_migrations},
    dto::auth::{LoginRequest, RegisterRequest},
    dto::users::{AdminUpdateUserRequest, UpdateProfileRequest},
    error::AppError,
    middleware::auth::AuthUser,
    services::{auth_service, user_service},
};
use uuid::Uuid;

async fn setup_pool() -> anyhow::Result<Option<DbPool>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    if std::env::var("JWT_SECRET").is_err() {
        unsafe { std::env::set_var("JWT_SECRET", "test-secret") };
    }

    // Migrations run through the SeaORM file runner shared with the other suites.
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    Ok(Some(create_pool(&database_url).await?))
}

fn unique_email() -> String {
    format!("{}@example.com", Uuid::new_v4())
}

async fn insert_user(pool: &DbPool, is_admin: bool) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, is_admin) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind("Seeded")
    .bind(unique_email())
    .bind("dummy")
    .bind(is_admin)
    .execute(pool)
    .await?;
    Ok(AuthUser {
        user_id: id,
        is_admin,
    })
}

#[tokio::test]
async fn register_login_and_profile_roundtrip() -> anyhow::Result<()> {
    let Some(pool) = setup_pool().await? else {
        return Ok(());
    };
    let email = unique_email();

    let registered = auth_service::register_user(
        &pool,
        RegisterRequest {
            name: "Jess".into(),
            email: email.clone(),
            password: "hunter22".into(),
        },
    )
    .await?;
    assert_eq!(registered.user.email, email);
    assert!(!registered.user.is_admin);
    assert!(!registered.token.is_empty());

    let logged_in = auth_service::login_user(
        &pool,
        LoginRequest {
            email: email.clone(),
            password: "hunter22".into(),
        },
    )
    .await?;
    assert_eq!(logged_in.user.id, registered.user.id);

    let auth = AuthUser {
        user_id: registered.user.id,
        is_admin: false,
    };
    let profile = auth_service::get_profile(&pool, &auth).await?;
    assert_eq!(profile.name, "Jess");

    let updated = auth_service::update_profile(
        &pool,
        &auth,
        UpdateProfileRequest {
            name: Some("Jesse".into()),
            email: None,
            password: None,
        },
    )
    .await?;
    assert_eq!(updated.name, "Jesse");
    assert_eq!(updated.email, email);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> anyhow::Result<()> {
    let Some(pool) = setup_pool().await? else {
        return Ok(());
    };
    let email = unique_email();

    auth_service::register_user(
        &pool,
        RegisterRequest {
            name: "First".into(),
            email: email.clone(),
            password: "password1".into(),
        },
    )
    .await?;

    let err = auth_service::register_user(
        &pool,
        RegisterRequest {
            name: "Second".into(),
            email,
            password: "password2".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_rejected() -> anyhow::Result<()> {
    let Some(pool) = setup_pool().await? else {
        return Ok(());
    };
    let email = unique_email();

    auth_service::register_user(
        &pool,
        RegisterRequest {
            name: "Casey".into(),
            email: email.clone(),
            password: "correct-horse".into(),
        },
    )
    .await?;

    let err = auth_service::login_user(
        &pool,
        LoginRequest {
            email,
            password: "battery-staple".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn user_admin_requires_admin() -> anyhow::Result<()> {
    let Some(pool) = setup_pool().await? else {
        return Ok(());
    };
    let admin = insert_user(&pool, true).await?;
    let regular = insert_user(&pool, false).await?;

    let err = user_service::list_users(&pool, &regular).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let users = user_service::list_users(&pool, &admin).await?;
    assert!(users.iter().any(|u| u.id == regular.user_id));

    let promoted = user_service::update_user(
        &pool,
        &admin,
        regular.user_id,
        AdminUpdateUserRequest {
            name: None,
            email: None,
            is_admin: Some(true),
        },
    )
    .await?;
    assert!(promoted.is_admin);

    user_service::delete_user(&pool, &admin, regular.user_id).await?;
    let err = user_service::get_user(&pool, &admin, regular.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}
