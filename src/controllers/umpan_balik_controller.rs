use actix_web::{get, post, web, Error, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth;
use crate::models::umpan_balik::{UmpanBalik, UmpanBalikForm};

#[derive(Deserialize)]
pub struct UmpanBalikQuery {
    pub aspirasi_id: Option<i32>,
}

#[get("/api/umpan-balik")]
pub async fn get_umpan_balik(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    query: web::Query<UmpanBalikQuery>,
) -> Result<impl Responder, Error> {
    auth::verify_jwt(&req)?;

    let aspirasi_id = query
        .aspirasi_id
        .ok_or_else(|| actix_web::error::ErrorBadRequest("aspirasi_id harus diisi"))?;

    let rows = sqlx::query_as::<_, UmpanBalik>(
        "SELECT
            ub.id, ub.aspirasi_id, ub.admin_id, ub.pesan, ub.tindakan,
            ub.estimasi_selesai, ub.created_at, ub.updated_at,
            u.nama_lengkap AS nama_admin
         FROM umpan_balik ub
         LEFT JOIN users u ON ub.admin_id = u.id
         WHERE ub.aspirasi_id = ?
         ORDER BY ub.created_at DESC",
    )
    .bind(aspirasi_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("Gagal mengambil umpan balik: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal mengambil data umpan balik")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "data": rows })))
}

#[post("/api/umpan-balik")]
pub async fn create_umpan_balik(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UmpanBalikForm>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    if !claims.is_admin() {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya admin yang dapat memberi umpan balik",
        ));
    }

    let data = payload.into_inner();
    let (aspirasi_id, pesan) = match (data.aspirasi_id, data.pesan.filter(|s| !s.trim().is_empty()))
    {
        (Some(id), Some(pesan)) => (id, pesan),
        _ => {
            return Err(actix_web::error::ErrorBadRequest(
                "aspirasi_id dan pesan harus diisi",
            ));
        }
    };

    // admin_id diambil dari session, bukan dari payload.
    let result = sqlx::query(
        "INSERT INTO umpan_balik (aspirasi_id, admin_id, pesan, tindakan, estimasi_selesai)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(aspirasi_id)
    .bind(claims.user_id)
    .bind(&pesan)
    .bind(&data.tindakan)
    .bind(data.estimasi_selesai)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("Gagal membuat umpan balik: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal membuat umpan balik")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Umpan balik berhasil dibuat",
        "id": result.last_insert_id(),
    })))
}
