use actix_web::{get, web, Error, HttpRequest, HttpResponse, Responder};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::json;
use sqlx::{prelude::FromRow, MySqlPool};

use crate::auth;

#[derive(Serialize, FromRow, Debug)]
struct KategoriCount {
    nama_kategori: String,
    jumlah: i64,
}

#[derive(Serialize, FromRow, Debug)]
struct StatusCount {
    status: String,
    jumlah: i64,
}

#[derive(Serialize, FromRow, Debug)]
struct TrendCount {
    bulan: String,
    jumlah: i64,
}

#[derive(Serialize, FromRow, Debug)]
struct UrgensiCount {
    tingkat_urgensi: String,
    jumlah: i64,
}

#[derive(Serialize, FromRow, Debug)]
struct OverallStats {
    total: i64,
    pending: i64,
    diproses: i64,
    selesai: i64,
    ditolak: i64,
    urgent: i64,
}

#[derive(Serialize, FromRow, Debug)]
struct RecentActivity {
    id: i32,
    judul: String,
    status: String,
    tingkat_urgensi: String,
    created_at: NaiveDateTime,
    nama_siswa: Option<String>,
}

fn stats_error(step: &str, e: sqlx::Error) -> Error {
    log::error!("Gagal mengambil statistik [{}]: {:?}", step, e);
    actix_web::error::ErrorInternalServerError("Gagal mengambil statistik")
}

// Enam query agregat independen, dihitung segar tiap request. Tidak ada
// jaminan konsistensi antar query; angka adalah snapshot per query.
#[get("/api/stats")]
pub async fn get_stats(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    if !claims.is_admin() {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya admin yang dapat mengakses statistik",
        ));
    }

    let kategori = sqlx::query_as::<_, KategoriCount>(
        "SELECT k.nama_kategori, COUNT(a.id) AS jumlah
         FROM kategori k
         LEFT JOIN aspirasi a ON k.id = a.kategori_id
         GROUP BY k.id, k.nama_kategori
         ORDER BY jumlah DESC",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| stats_error("kategori", e))?;

    let status = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS jumlah FROM aspirasi GROUP BY status",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| stats_error("status", e))?;

    let trend = sqlx::query_as::<_, TrendCount>(
        "SELECT DATE_FORMAT(tanggal_pengaduan, '%Y-%m') AS bulan, COUNT(*) AS jumlah
         FROM aspirasi
         WHERE tanggal_pengaduan >= DATE_SUB(CURDATE(), INTERVAL 6 MONTH)
         GROUP BY bulan
         ORDER BY bulan ASC",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| stats_error("trend", e))?;

    let urgensi = sqlx::query_as::<_, UrgensiCount>(
        "SELECT tingkat_urgensi, COUNT(*) AS jumlah FROM aspirasi GROUP BY tingkat_urgensi",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| stats_error("urgensi", e))?;

    // SUM() di MySQL menghasilkan DECIMAL; cast ke SIGNED supaya terpetakan
    // ke i64.
    let overall = sqlx::query_as::<_, OverallStats>(
        "SELECT
            COUNT(*) AS total,
            CAST(COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS SIGNED) AS pending,
            CAST(COALESCE(SUM(CASE WHEN status = 'diproses' THEN 1 ELSE 0 END), 0) AS SIGNED) AS diproses,
            CAST(COALESCE(SUM(CASE WHEN status = 'selesai' THEN 1 ELSE 0 END), 0) AS SIGNED) AS selesai,
            CAST(COALESCE(SUM(CASE WHEN status = 'ditolak' THEN 1 ELSE 0 END), 0) AS SIGNED) AS ditolak,
            CAST(COALESCE(SUM(CASE WHEN tingkat_urgensi = 'tinggi' THEN 1 ELSE 0 END), 0) AS SIGNED) AS urgent
         FROM aspirasi",
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| stats_error("overall", e))?;

    let recent_activity = sqlx::query_as::<_, RecentActivity>(
        "SELECT a.id, a.judul, a.status, a.tingkat_urgensi, a.created_at,
                u.nama_lengkap AS nama_siswa
         FROM aspirasi a
         LEFT JOIN users u ON a.user_id = u.id
         ORDER BY a.created_at DESC
         LIMIT 5",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| stats_error("recent_activity", e))?;

    Ok(HttpResponse::Ok().json(json!({
        "kategori": kategori,
        "status": status,
        "trend": trend,
        "urgensi": urgensi,
        "overall": overall,
        "recentActivity": recent_activity,
    })))
}
