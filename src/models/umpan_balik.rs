use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct UmpanBalik {
    pub id: i32,
    pub aspirasi_id: i32,
    pub admin_id: i32,
    pub pesan: String,
    pub tindakan: Option<String>,
    pub estimasi_selesai: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub nama_admin: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UmpanBalikForm {
    pub aspirasi_id: Option<i32>,
    pub pesan: Option<String>,
    pub tindakan: Option<String>,
    pub estimasi_selesai: Option<NaiveDate>,
}
