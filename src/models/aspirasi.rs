use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Baris daftar aspirasi: join nama siswa + kategori, plus dua agregat
// (jumlah umpan balik dan persentase progres terakhir).
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AspirasiListItem {
    pub id: i32,
    pub user_id: i32,
    pub kategori_id: i32,
    pub judul: String,
    pub deskripsi: String,
    pub lokasi: Option<String>,
    pub tingkat_urgensi: String,
    pub status: String,
    pub tanggal_pengaduan: NaiveDate,
    pub foto_bukti: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub nama_siswa: Option<String>,
    pub kelas: Option<String>,
    pub nama_kategori: Option<String>,
    pub jumlah_umpan_balik: i64,
    pub persentase_progres: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AspirasiDetail {
    pub id: i32,
    pub user_id: i32,
    pub kategori_id: i32,
    pub judul: String,
    pub deskripsi: String,
    pub lokasi: Option<String>,
    pub tingkat_urgensi: String,
    pub status: String,
    pub tanggal_pengaduan: NaiveDate,
    pub foto_bukti: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub nama_siswa: Option<String>,
    pub kelas: Option<String>,
    pub nama_kategori: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AspirasiForm {
    pub kategori_id: Option<i32>,
    pub judul: Option<String>,
    pub deskripsi: Option<String>,
    pub lokasi: Option<String>,
    pub tingkat_urgensi: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub id: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AspirasiFilter {
    pub tanggal: Option<String>,
    pub bulan: Option<u32>,
    pub tahun: Option<i32>,
    pub user_id: Option<i32>,
    pub kategori_id: Option<i32>,
    pub status: Option<String>,
}
