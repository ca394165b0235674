use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use storefront_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::products::{CreateProductRequest, UpdateProductRequest},
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
    entity::users::ActiveModel as UserActive,
};
use uuid::Uuid;

async fn setup_state() -> anyhow::Result<Option<AppState>> {
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

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    Ok(Some(AppState { pool, orm }))
}

async fn create_user(state: &AppState, is_admin: bool) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    UserActive {
        id: Set(id),
        name: Set("Catalog Admin".into()),
        email: Set(format!("{id}@example.com")),
        password_hash: Set("dummy".into()),
        is_admin: Set(is_admin),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(AuthUser {
        user_id: id,
        is_admin,
    })
}

fn blank_create() -> CreateProductRequest {
    CreateProductRequest {
        name: None,
        brand: None,
        category: None,
        description: None,
        image: None,
        price: None,
        count_in_stock: None,
    }
}

#[tokio::test]
async fn create_fills_catalog_defaults() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, true).await?;

    let product = product_service::create_product(&state, &admin, blank_create()).await?;
    assert_eq!(product.name, "Sample Name");
    assert_eq!(product.price, Decimal::ZERO);
    assert_eq!(product.count_in_stock, 0);
    assert_eq!(product.num_reviews, 0);
    assert_eq!(product.user_id, Some(admin.user_id));
    Ok(())
}

#[tokio::test]
async fn catalog_mutations_require_admin() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let regular = create_user(&state, false).await?;

    let err = product_service::create_product(&state, &regular, blank_create())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = product_service::delete_product(&state, &regular, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    Ok(())
}

#[tokio::test]
async fn update_patches_only_supplied_fields() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, true).await?;

    let created = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: Some("Desk Lamp".into()),
            brand: Some("Lumen".into()),
            category: Some("Home".into()),
            description: Some("Warm light".into()),
            image: Some("/images/lamp.jpg".into()),
            price: Some(Decimal::new(3499, 2)),
            count_in_stock: Some(7),
        },
    )
    .await?;

    let updated = product_service::update_product(
        &state,
        &admin,
        created.id,
        UpdateProductRequest {
            name: None,
            brand: None,
            category: None,
            description: None,
            image: None,
            price: Some(Decimal::new(2999, 2)),
            count_in_stock: None,
        },
    )
    .await?;
    assert_eq!(updated.name, "Desk Lamp");
    assert_eq!(updated.price, Decimal::new(2999, 2));
    assert_eq!(updated.count_in_stock, 7);
    Ok(())
}

#[tokio::test]
async fn negative_price_is_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, true).await?;

    let mut payload = blank_create();
    payload.price = Some(Decimal::new(-100, 2));
    let err = product_service::create_product(&state, &admin, payload)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn delete_then_get_is_not_found() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, true).await?;

    let created = product_service::create_product(&state, &admin, blank_create()).await?;
    product_service::delete_product(&state, &admin, created.id).await?;

    let err = product_service::get_product(&state, created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = product_service::delete_product(&state, &admin, created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn search_matches_brand() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, true).await?;

    // Unique brand so the assertion is immune to other tests' data.
    let brand = format!("Brand-{}", Uuid::new_v4());
    let mut payload = blank_create();
    payload.name = Some("Searchable".into());
    payload.brand = Some(brand.clone());
    let created = product_service::create_product(&state, &admin, payload).await?;

    let found = product_service::list_products(
        &state,
        ProductQuery {
            page: Some(1),
            per_page: Some(20),
            q: Some(brand),
            sort_by: None,
            sort_order: None,
        },
    )
    .await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, created.id);
    Ok(())
}
