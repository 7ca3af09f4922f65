use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub nama_lengkap: String,
    pub role: String,
    pub kelas: Option<String>,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
}

// Varian tanpa kolom password, untuk semua response ke client.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub nama_lengkap: String,
    pub role: String,
    pub kelas: Option<String>,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct UserForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub nama_lengkap: Option<String>,
    pub role: Option<String>,
    pub kelas: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserUpdateForm {
    pub id: Option<i32>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub nama_lengkap: Option<String>,
    pub role: Option<String>,
    pub kelas: Option<String>,
    pub email: Option<String>,
}
