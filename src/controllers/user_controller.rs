use actix_web::{delete, get, post, put, web, Error, HttpRequest, HttpResponse, Responder};
use bcrypt::{hash, DEFAULT_COST};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth;
use crate::models::user::{UserForm, UserProfile, UserUpdateForm};

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

// Password kosong pada form edit berarti "jangan ganti password".
fn wants_password_change(password: &Option<String>) -> bool {
    password
        .as_deref()
        .map(|p| !p.trim().is_empty())
        .unwrap_or(false)
}

#[get("/api/users")]
pub async fn get_users(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    if !claims.is_admin() {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya admin yang dapat mengelola user",
        ));
    }

    let rows = sqlx::query_as::<_, UserProfile>(
        "SELECT id, username, nama_lengkap, role, kelas, email, created_at
         FROM users
         ORDER BY created_at DESC",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("Gagal mengambil users: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal mengambil data users")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "data": rows })))
}

#[post("/api/users")]
pub async fn create_user(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UserForm>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    if !claims.is_admin() {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya admin yang dapat mengelola user",
        ));
    }

    let data = payload.into_inner();
    let username = data.username.filter(|s| !s.trim().is_empty());
    let password = data.password.filter(|s| !s.trim().is_empty());
    let nama_lengkap = data.nama_lengkap.filter(|s| !s.trim().is_empty());
    let role = data.role.filter(|s| !s.trim().is_empty());

    let (username, password, nama_lengkap, role) = match (username, password, nama_lengkap, role) {
        (Some(u), Some(p), Some(n), Some(r)) => (u, p, n, r),
        _ => {
            return Err(actix_web::error::ErrorBadRequest(
                "Username, password, nama lengkap, dan role harus diisi",
            ));
        }
    };

    let hashed_password = hash(&password, DEFAULT_COST).map_err(|e| {
        log::error!("Gagal hash password: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal menambahkan user")
    })?;

    // Pre-check hanya untuk pesan yang ramah; constraint UNIQUE di DB yang
    // menjadi penegak akhir, keduanya dalam satu transaksi.
    let mut tx = pool.begin().await.map_err(|e| {
        log::error!("Gagal memulai transaksi: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal menambahkan user")
    })?;

    let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
        .bind(&username)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Gagal cek username: {:?}", e);
            actix_web::error::ErrorInternalServerError("Gagal menambahkan user")
        })?;

    if existing.is_some() {
        return Err(actix_web::error::ErrorBadRequest("Username sudah digunakan"));
    }

    let result = sqlx::query(
        "INSERT INTO users (username, password, nama_lengkap, role, kelas, email)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&username)
    .bind(&hashed_password)
    .bind(&nama_lengkap)
    .bind(&role)
    .bind(&data.kelas)
    .bind(&data.email)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            return actix_web::error::ErrorBadRequest("Username sudah digunakan");
        }
        log::error!("Gagal menambahkan user: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal menambahkan user")
    })?;

    tx.commit().await.map_err(|e| {
        log::error!("Gagal commit transaksi: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal menambahkan user")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "User berhasil ditambahkan",
        "id": result.last_insert_id(),
    })))
}

#[put("/api/users")]
pub async fn update_user(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UserUpdateForm>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    if !claims.is_admin() {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya admin yang dapat mengelola user",
        ));
    }

    let data = payload.into_inner();
    let id = data.id;
    let username = data.username.filter(|s| !s.trim().is_empty());
    let nama_lengkap = data.nama_lengkap.filter(|s| !s.trim().is_empty());
    let role = data.role.filter(|s| !s.trim().is_empty());

    let (id, username, nama_lengkap, role) = match (id, username, nama_lengkap, role) {
        (Some(i), Some(u), Some(n), Some(r)) => (i, u, n, r),
        _ => {
            return Err(actix_web::error::ErrorBadRequest(
                "ID, username, nama lengkap, dan role harus diisi",
            ));
        }
    };

    let existing: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = ? AND id != ?")
            .bind(&username)
            .bind(id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                log::error!("Gagal cek username: {:?}", e);
                actix_web::error::ErrorInternalServerError("Gagal mengupdate user")
            })?;

    if existing.is_some() {
        return Err(actix_web::error::ErrorBadRequest(
            "Username sudah digunakan oleh user lain",
        ));
    }

    let result = if wants_password_change(&data.password) {
        let hashed_password =
            hash(data.password.as_deref().unwrap_or_default(), DEFAULT_COST).map_err(|e| {
                log::error!("Gagal hash password: {:?}", e);
                actix_web::error::ErrorInternalServerError("Gagal mengupdate user")
            })?;

        sqlx::query(
            "UPDATE users
             SET username = ?, password = ?, nama_lengkap = ?, role = ?, kelas = ?, email = ?
             WHERE id = ?",
        )
        .bind(&username)
        .bind(&hashed_password)
        .bind(&nama_lengkap)
        .bind(&role)
        .bind(&data.kelas)
        .bind(&data.email)
        .bind(id)
        .execute(pool.get_ref())
        .await
    } else {
        // Password kosong: hash lama dipertahankan.
        sqlx::query(
            "UPDATE users
             SET username = ?, nama_lengkap = ?, role = ?, kelas = ?, email = ?
             WHERE id = ?",
        )
        .bind(&username)
        .bind(&nama_lengkap)
        .bind(&role)
        .bind(&data.kelas)
        .bind(&data.email)
        .bind(id)
        .execute(pool.get_ref())
        .await
    }
    .map_err(|e| {
        if is_unique_violation(&e) {
            return actix_web::error::ErrorBadRequest(
                "Username sudah digunakan oleh user lain",
            );
        }
        log::error!("Gagal mengupdate user {}: {:?}", id, e);
        actix_web::error::ErrorInternalServerError("Gagal mengupdate user")
    })?;

    if result.rows_affected() == 0 {
        return Err(actix_web::error::ErrorNotFound("User tidak ditemukan"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "User berhasil diupdate" })))
}

#[derive(Deserialize)]
pub struct DeleteQuery {
    pub id: Option<i32>,
}

#[delete("/api/users")]
pub async fn delete_user(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    query: web::Query<DeleteQuery>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    if !claims.is_admin() {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya admin yang dapat mengelola user",
        ));
    }

    let id = query
        .id
        .ok_or_else(|| actix_web::error::ErrorBadRequest("ID user harus diisi"))?;

    if id == claims.user_id {
        return Err(actix_web::error::ErrorBadRequest(
            "Tidak dapat menghapus user sendiri",
        ));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            log::error!("Gagal menghapus user {}: {:?}", id, e);
            actix_web::error::ErrorInternalServerError("Gagal menghapus user")
        })?;

    if result.rows_affected() == 0 {
        return Err(actix_web::error::ErrorNotFound("User tidak ditemukan"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "User berhasil dihapus" })))
}

#[cfg(test)]
mod tests {
    use super::wants_password_change;

    #[test]
    fn password_kosong_tidak_diganti() {
        assert!(!wants_password_change(&None));
        assert!(!wants_password_change(&Some("".into())));
        assert!(!wants_password_change(&Some("   ".into())));
    }

    #[test]
    fn password_terisi_diganti() {
        assert!(wants_password_change(&Some("baru123".into())));
    }
}
