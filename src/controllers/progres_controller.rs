use actix_web::{get, post, web, Error, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth;
use crate::models::progres::{ProgresForm, ProgresPerbaikan};

#[derive(Deserialize)]
pub struct ProgresQuery {
    pub aspirasi_id: Option<i32>,
}

#[get("/api/progres")]
pub async fn get_progres(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    query: web::Query<ProgresQuery>,
) -> Result<impl Responder, Error> {
    auth::verify_jwt(&req)?;

    let aspirasi_id = query
        .aspirasi_id
        .ok_or_else(|| actix_web::error::ErrorBadRequest("aspirasi_id harus diisi"))?;

    let rows = sqlx::query_as::<_, ProgresPerbaikan>(
        "SELECT id, aspirasi_id, persentase, keterangan, foto_progres, created_at
         FROM progres_perbaikan
         WHERE aspirasi_id = ?
         ORDER BY created_at DESC",
    )
    .bind(aspirasi_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("Gagal mengambil progres: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal mengambil data progres")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "data": rows })))
}

#[post("/api/progres")]
pub async fn create_progres(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ProgresForm>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    if !claims.is_admin() {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya admin yang dapat menambahkan progres",
        ));
    }

    let data = payload.into_inner();
    let (aspirasi_id, persentase) = match (data.aspirasi_id, data.persentase) {
        (Some(id), Some(p)) => (id, p),
        _ => {
            return Err(actix_web::error::ErrorBadRequest(
                "aspirasi_id dan persentase harus diisi",
            ));
        }
    };

    // Rentang persentase tidak dibatasi di sini; form client yang membatasi
    // 0-100.
    let result = sqlx::query(
        "INSERT INTO progres_perbaikan (aspirasi_id, persentase, keterangan) VALUES (?, ?, ?)",
    )
    .bind(aspirasi_id)
    .bind(persentase)
    .bind(&data.keterangan)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("Gagal menambahkan progres: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal menambahkan progres")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Progres berhasil ditambahkan",
        "id": result.last_insert_id(),
    })))
}
