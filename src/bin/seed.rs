use marketplace_api::{
    config::AppConfig,
    db::create_pool,
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin", "admin@ornek.com", "admin123", "admin").await?;
    let supplier_id =
        ensure_user(&pool, "tedarikci", "tedarikci@ornek.com", "tedarikci123", "supplier").await?;
    ensure_user(&pool, "musteri", "musteri@ornek.com", "musteri123", "customer").await?;

    seed_products(&pool, supplier_id, "tedarikci").await?;

    println!("Seed completed. Admin ID: {admin_id}, Supplier ID: {supplier_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<i32> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let row: Option<(i32,)> = sqlx::query_as(
        r#"
        INSERT INTO users (username, password_hash, email, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(email)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If the user already exists under another conflict target, fetch the id.
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (i32,) = sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {username} (role={role})");
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool, user_id: i32, created_by: &str) -> anyhow::Result<()> {
    let products = vec![
        ("El Yapımı Seramik Fincan", 250, "Çift cidarlı seramik kahve fincanı"),
        ("Ahşap Kesme Tahtası", 400, "Ceviz ağacından kesme tahtası"),
        ("Dokuma Kilim", 1800, "El dokuması yün kilim, 120x180"),
        ("Zeytinyağlı Sabun Seti", 120, "Doğal zeytinyağlı sabun, 4'lü paket"),
    ];

    for (name, price, description) in products {
        let exists: Option<(uuid::Uuid,)> =
            sqlx::query_as("SELECT id FROM products WHERE name = $1")
                .bind(name)
                .fetch_optional(pool)
                .await?;
        if exists.is_some() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, description, user_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(name)
        .bind(price as i64)
        .bind(description)
        .bind(user_id)
        .bind(created_by)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
