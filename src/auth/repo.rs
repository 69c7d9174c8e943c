use crate::auth::repo_types::User;
use sqlx::PgPool;

impl User {
    /// Find a user by exact email match.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT email, password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user row. The primary key on email is the real
    /// uniqueness check; callers inspect the error for violations.
    pub async fn create(db: &PgPool, email: &str, password: &str) -> Result<User, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password)
            VALUES ($1, $2)
            RETURNING email, password
            "#,
        )
        .bind(email)
        .bind(password)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}
