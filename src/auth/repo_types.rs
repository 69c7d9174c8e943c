use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub email: String,            // unique identifier, exact match as stored
    #[serde(skip_serializing)]
    pub password: String,         // Argon2 hash or the OAuth sentinel, never exposed
}
