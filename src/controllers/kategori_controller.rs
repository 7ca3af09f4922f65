use actix_web::{delete, get, post, put, web, Error, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth;
use crate::models::kategori::{Kategori, KategoriForm, KategoriUpdateForm};

#[get("/api/kategori")]
pub async fn get_kategori(pool: web::Data<MySqlPool>) -> Result<impl Responder, Error> {
    let rows = sqlx::query_as::<_, Kategori>(
        "SELECT id, nama_kategori, deskripsi FROM kategori ORDER BY nama_kategori ASC",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("Gagal mengambil kategori: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal mengambil data kategori")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "data": rows })))
}

#[post("/api/kategori")]
pub async fn create_kategori(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    payload: web::Json<KategoriForm>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    if !claims.is_admin() {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya admin yang dapat mengelola kategori",
        ));
    }

    let data = payload.into_inner();
    let nama_kategori = data
        .nama_kategori
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| actix_web::error::ErrorBadRequest("Nama kategori harus diisi"))?;

    let result = sqlx::query("INSERT INTO kategori (nama_kategori, deskripsi) VALUES (?, ?)")
        .bind(&nama_kategori)
        .bind(&data.deskripsi)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            log::error!("Gagal menambahkan kategori: {:?}", e);
            actix_web::error::ErrorInternalServerError("Gagal menambahkan kategori")
        })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Kategori berhasil ditambahkan",
        "id": result.last_insert_id(),
    })))
}

#[put("/api/kategori")]
pub async fn update_kategori(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    payload: web::Json<KategoriUpdateForm>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    if !claims.is_admin() {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya admin yang dapat mengelola kategori",
        ));
    }

    let data = payload.into_inner();
    let (id, nama_kategori) = match (
        data.id,
        data.nama_kategori.filter(|s| !s.trim().is_empty()),
    ) {
        (Some(id), Some(nama)) => (id, nama),
        _ => {
            return Err(actix_web::error::ErrorBadRequest(
                "ID dan nama kategori harus diisi",
            ));
        }
    };

    let result = sqlx::query("UPDATE kategori SET nama_kategori = ?, deskripsi = ? WHERE id = ?")
        .bind(&nama_kategori)
        .bind(&data.deskripsi)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            log::error!("Gagal mengupdate kategori {}: {:?}", id, e);
            actix_web::error::ErrorInternalServerError("Gagal mengupdate kategori")
        })?;

    if result.rows_affected() == 0 {
        return Err(actix_web::error::ErrorNotFound("Kategori tidak ditemukan"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Kategori berhasil diupdate" })))
}

#[derive(Deserialize)]
pub struct DeleteQuery {
    pub id: Option<i32>,
}

#[delete("/api/kategori")]
pub async fn delete_kategori(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    query: web::Query<DeleteQuery>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    if !claims.is_admin() {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya admin yang dapat mengelola kategori",
        ));
    }

    let id = query
        .id
        .ok_or_else(|| actix_web::error::ErrorBadRequest("ID kategori harus diisi"))?;

    // Guard referensi dan delete berjalan dalam satu transaksi supaya hitung
    // dan hapus tidak bisa diselingi insert aspirasi baru.
    let mut tx = pool.begin().await.map_err(|e| {
        log::error!("Gagal memulai transaksi: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal menghapus kategori")
    })?;

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM aspirasi WHERE kategori_id = ? FOR UPDATE")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                log::error!("Gagal menghitung referensi kategori {}: {:?}", id, e);
                actix_web::error::ErrorInternalServerError("Gagal menghapus kategori")
            })?;

    if count > 0 {
        return Err(actix_web::error::ErrorBadRequest(
            "Kategori tidak dapat dihapus karena sudah digunakan",
        ));
    }

    let result = sqlx::query("DELETE FROM kategori WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Gagal menghapus kategori {}: {:?}", id, e);
            actix_web::error::ErrorInternalServerError("Gagal menghapus kategori")
        })?;

    if result.rows_affected() == 0 {
        return Err(actix_web::error::ErrorNotFound("Kategori tidak ditemukan"));
    }

    tx.commit().await.map_err(|e| {
        log::error!("Gagal commit transaksi: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal menghapus kategori")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Kategori berhasil dihapus" })))
}
