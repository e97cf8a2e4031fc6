//! Database seeding command.
//!
//! Loads a small sample catalog and three accounts (one admin) so a fresh
//! checkout has something to browse. Importing always wipes existing data
//! first, so the seeded state is reproducible.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use proshop_core::Email;
use proshop_server::db::{self, UserRepository};
use proshop_server::services::auth::hash_password;

use super::{CommandError, database_url};

/// All seeded accounts share this password.
const SEED_PASSWORD: &str = "123456";

struct SeedProduct {
    name: &'static str,
    image: &'static str,
    description: &'static str,
    brand: &'static str,
    category: &'static str,
    price: f64,
    count_in_stock: i64,
}

const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Airpods Wireless Bluetooth Headphones",
        image: "/images/airpods.jpg",
        description: "Bluetooth technology lets you connect it with compatible devices wirelessly High-quality AAC audio offers immersive listening experience Built-in microphone allows you to take calls while working",
        brand: "Apple",
        category: "Electronics",
        price: 89.99,
        count_in_stock: 10,
    },
    SeedProduct {
        name: "iPhone 11 Pro 256GB Memory",
        image: "/images/phone.jpg",
        description: "Introducing the iPhone 11 Pro. A transformative triple-camera system that adds tons of capability without complexity. An unprecedented leap in battery life",
        brand: "Apple",
        category: "Electronics",
        price: 599.99,
        count_in_stock: 7,
    },
    SeedProduct {
        name: "Cannon EOS 80D DSLR Camera",
        image: "/images/camera.jpg",
        description: "Characterized by versatile imaging specs, the Canon EOS 80D further clarifies itself using a pair of robust focusing systems and an intuitive design",
        brand: "Cannon",
        category: "Electronics",
        price: 929.99,
        count_in_stock: 5,
    },
    SeedProduct {
        name: "Sony Playstation 4 Pro White Version",
        image: "/images/playstation.jpg",
        description: "The ultimate home entertainment center starts with PlayStation. Whether you are into gaming, HD movies, television, music",
        brand: "Sony",
        category: "Electronics",
        price: 399.99,
        count_in_stock: 11,
    },
    SeedProduct {
        name: "Logitech G-Series Gaming Mouse",
        image: "/images/mouse.jpg",
        description: "Get a better handle on your games with this Logitech LIGHTSYNC gaming mouse. The six programmable buttons allow customization for a smooth playing experience",
        brand: "Logitech",
        category: "Electronics",
        price: 49.99,
        count_in_stock: 7,
    },
    SeedProduct {
        name: "Amazon Echo Dot 3rd Generation",
        image: "/images/alexa.jpg",
        description: "Meet Echo Dot - Our most popular smart speaker with a fabric design. It is our most compact smart speaker that fits perfectly into small spaces",
        brand: "Amazon",
        category: "Electronics",
        price: 29.99,
        count_in_stock: 0,
    },
];

/// Wipe all data and load the sample users and catalog.
///
/// # Errors
///
/// Returns an error if `PROSHOP_DATABASE_URL` is not set or a database
/// operation fails.
pub async fn import() -> Result<(), CommandError> {
    let pool = connect().await?;

    clear(&pool).await?;

    let users = UserRepository::new(&pool);

    let admin = users
        .create(
            "Admin User",
            &Email::parse("admin@example.com").map_err(auth_err)?,
            &hash_password(SEED_PASSWORD)?,
            true,
        )
        .await?;
    users
        .create(
            "John Doe",
            &Email::parse("john@example.com").map_err(auth_err)?,
            &hash_password(SEED_PASSWORD)?,
            false,
        )
        .await?;
    users
        .create(
            "Jane Doe",
            &Email::parse("jane@example.com").map_err(auth_err)?,
            &hash_password(SEED_PASSWORD)?,
            false,
        )
        .await?;

    info!("Seeded 3 users (admin: admin@example.com)");

    // Seeded products are owned by the admin account.
    for product in SEED_PRODUCTS {
        sqlx::query(
            "INSERT INTO products
                 (user_id, name, image, description, brand, category,
                  price, count_in_stock, rating, num_reviews, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, 0, ?9, ?9)",
        )
        .bind(admin.id)
        .bind(product.name)
        .bind(product.image)
        .bind(product.description)
        .bind(product.brand)
        .bind(product.category)
        .bind(product.price)
        .bind(product.count_in_stock)
        .bind(Utc::now())
        .execute(&pool)
        .await?;
    }

    info!("Seeded {} products", SEED_PRODUCTS.len());
    info!("Data imported!");
    Ok(())
}

/// Wipe all data.
///
/// # Errors
///
/// Returns an error if `PROSHOP_DATABASE_URL` is not set or a database
/// operation fails.
pub async fn destroy() -> Result<(), CommandError> {
    let pool = connect().await?;
    clear(&pool).await?;

    info!("Data destroyed!");
    Ok(())
}

async fn connect() -> Result<SqlitePool, CommandError> {
    let database_url = database_url()?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Ensuring schema is up to date...");
    db::MIGRATOR.run(&pool).await?;

    Ok(pool)
}

/// Delete all rows, children first to satisfy foreign keys.
async fn clear(pool: &SqlitePool) -> Result<(), CommandError> {
    sqlx::query("DELETE FROM order_items").execute(pool).await?;
    sqlx::query("DELETE FROM orders").execute(pool).await?;
    sqlx::query("DELETE FROM reviews").execute(pool).await?;
    sqlx::query("DELETE FROM products").execute(pool).await?;
    sqlx::query("DELETE FROM users").execute(pool).await?;
    Ok(())
}

fn auth_err(e: proshop_core::EmailError) -> CommandError {
    CommandError::Auth(e.into())
}
