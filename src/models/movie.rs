use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub poster_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub poster_url: Option<String>,
}
