use shared::models::{User, UserProfile};
use sqlx::PgPool;

pub async fn upsert(
    pool: &PgPool,
    id: &str,
    profile: &UserProfile,
    now: i64,
) -> Result<User, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO users (id, email, first_name, last_name, username, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6)
         ON CONFLICT (id) DO UPDATE SET
            email = EXCLUDED.email, first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name, username = EXCLUDED.username,
            updated_at = EXCLUDED.updated_at
         RETURNING id, email, first_name, last_name, username, created_at, updated_at",
    )
    .bind(id)
    .bind(&profile.email)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.username)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
