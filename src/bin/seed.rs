use rust_decimal::Decimal;
use storefront_api::{
    config::AppConfig,
    db::create_pool,
    services::auth_service::hash_password,
};
use uuid::Uuid;

struct SampleProduct {
    name: &'static str,
    price: Decimal,
    brand: &'static str,
    category: &'static str,
    description: &'static str,
    count_in_stock: i32,
    image: &'static str,
    rating: Decimal,
    num_reviews: i32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "Admin", "admin@example.com", "admin123", true).await?;
    let user_id = ensure_user(&pool, "User", "user@example.com", "user123", false).await?;
    seed_products(&pool, admin_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, is_admin) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(is_admin)
    .execute(pool)
    .await?;

    Ok(id)
}

async fn seed_products(pool: &sqlx::PgPool, owner_id: Uuid) -> anyhow::Result<()> {
    let count: (i64,) = sqlx::query_as("SELECT count(*) FROM products")
        .fetch_one(pool)
        .await?;
    if count.0 > 0 {
        return Ok(());
    }

    let samples = [
        SampleProduct {
            name: "Running Shoes",
            price: Decimal::new(7999, 2),
            brand: "Stride",
            category: "Footwear",
            description: "Lightweight running shoes ideal for daily workouts.",
            count_in_stock: 15,
            image: "/images/shoe.jpg",
            rating: Decimal::new(45, 1),
            num_reviews: 12,
        },
        SampleProduct {
            name: "Vivo Y36 Smartphone",
            price: Decimal::new(21900, 2),
            brand: "Vivo",
            category: "Electronics",
            description: "6.58\" display, 8GB RAM, and a 5000mAh battery for all-day power.",
            count_in_stock: 9,
            image: "/images/vivo-mobile.jpg",
            rating: Decimal::new(42, 1),
            num_reviews: 7,
        },
        SampleProduct {
            name: "Classic White T-Shirt",
            price: Decimal::new(1999, 2),
            brand: "Everyday Basics",
            category: "Apparel",
            description: "Soft cotton tee with a tailored fit for casual wear.",
            count_in_stock: 30,
            image: "/images/white-t-shirt.jpg",
            rating: Decimal::new(48, 1),
            num_reviews: 25,
        },
        SampleProduct {
            name: "Bluetooth Headphones",
            price: Decimal::new(5999, 2),
            brand: "SoundWave",
            category: "Electronics",
            description: "Noise-cancelling over-ear headphones with 20-hour battery life.",
            count_in_stock: 20,
            image: "/images/headphones.jpg",
            rating: Decimal::new(46, 1),
            num_reviews: 18,
        },
        SampleProduct {
            name: "Smart Fitness Watch",
            price: Decimal::new(12999, 2),
            brand: "PulseTrack",
            category: "Wearables",
            description: "Track workouts, sleep, and heart rate with built-in GPS.",
            count_in_stock: 14,
            image: "/images/fitness-watch.jpg",
            rating: Decimal::new(44, 1),
            num_reviews: 10,
        },
    ];

    for sample in samples {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, user_id, name, brand, category, description, image, price, rating, num_reviews, count_in_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(sample.name)
        .bind(sample.brand)
        .bind(sample.category)
        .bind(sample.description)
        .bind(sample.image)
        .bind(sample.price)
        .bind(sample.rating)
        .bind(sample.num_reviews)
        .bind(sample.count_in_stock)
        .execute(pool)
        .await?;
    }

    Ok(())
}
