use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ProgresPerbaikan {
    pub id: i32,
    pub aspirasi_id: i32,
    pub persentase: i32,
    pub keterangan: Option<String>,
    pub foto_progres: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct ProgresForm {
    pub aspirasi_id: Option<i32>,
    pub persentase: Option<i32>,
    pub keterangan: Option<String>,
}
