use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Kategori {
    pub id: i32,
    pub nama_kategori: String,
    pub deskripsi: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KategoriForm {
    pub nama_kategori: Option<String>,
    pub deskripsi: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KategoriUpdateForm {
    pub id: Option<i32>,
    pub nama_kategori: Option<String>,
    pub deskripsi: Option<String>,
}
