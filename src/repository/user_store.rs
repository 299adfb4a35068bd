use crate::{
    db::DbPool,
    error::AppResult,
    models::User,
    repository::{NewUser, UserChanges, UserRepository},
};

#[derive(Clone)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    async fn save(&self, user: &NewUser) -> AppResult<User> {
        let user: User = sqlx::query_as(
            "INSERT INTO users (username, password_hash, email, role) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update(&self, id: i32, changes: &UserChanges) -> AppResult<bool> {
        if changes.is_empty() {
            return Ok(false);
        }

        let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE users SET ");
        let mut fields = builder.separated(", ");
        if let Some(username) = &changes.username {
            fields.push("username = ").push_bind_unseparated(username);
        }
        if let Some(email) = &changes.email {
            fields.push("email = ").push_bind_unseparated(email);
        }
        if let Some(password_hash) = &changes.password_hash {
            fields
                .push("password_hash = ")
                .push_bind_unseparated(password_hash);
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_password(&self, id: i32, password_hash: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}
