use sqlx::FromRow;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,                // assigned by the store
    pub email: String,
    pub username: String,
    pub password_hash: String,   // argon2 PHC string
    pub creation_timestamp: i64, // unix seconds
}

/// Everything but the id, which the store assigns on insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub creation_timestamp: i64,
}
