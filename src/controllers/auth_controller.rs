use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    get, post, web, Error, HttpRequest, HttpResponse, Responder,
};
use bcrypt::verify;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth;
use crate::models::user::User;

#[derive(Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[post("/api/login")]
pub async fn login(
    pool: web::Data<MySqlPool>,
    payload: web::Json<LoginPayload>,
) -> Result<impl Responder, Error> {
    let username = payload.username.trim();
    let password = payload.password.trim();

    if username.is_empty() || password.is_empty() {
        return Err(actix_web::error::ErrorBadRequest(
            "Username dan password harus diisi",
        ));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password, nama_lengkap, role, kelas, email, created_at
         FROM users WHERE username = ? LIMIT 1",
    )
    .bind(username)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("DB error saat login: {:?}", e);
        actix_web::error::ErrorInternalServerError("Login gagal")
    })?
    .ok_or_else(|| actix_web::error::ErrorUnauthorized("Username tidak ditemukan"))?;

    let ok = verify(password, &user.password).map_err(|e| {
        log::error!("bcrypt verify: {:?}", e);
        actix_web::error::ErrorInternalServerError("Login gagal")
    })?;

    if !ok {
        return Err(actix_web::error::ErrorUnauthorized("Password salah"));
    }

    let token = auth::generate_jwt(&user).map_err(|e| {
        log::error!("Gagal menghasilkan JWT: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal menghasilkan token")
    })?;

    let access_cookie = Cookie::build("access_token", token)
        .path("/")
        .http_only(true)
        .secure(false) // false untuk development (HTTP)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(30))
        .finish();

    Ok(HttpResponse::Ok().cookie(access_cookie).json(json!({
        "message": "Berhasil login",
        "role": user.role,
    })))
}

#[post("/api/logout")]
pub async fn logout() -> Result<impl Responder, Error> {
    // Cookie harus sama persis dengan yang dibuat saat login.
    let access_cookie = Cookie::build("access_token", "")
        .path("/")
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(0))
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(access_cookie)
        .json(json!({ "message": "Berhasil logout" })))
}

#[get("/api/me")]
pub async fn get_current_user(req: HttpRequest) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;

    Ok(HttpResponse::Ok().json(json!({
        "data": {
            "id": claims.user_id,
            "username": claims.sub,
            "nama_lengkap": claims.nama_user,
            "role": claims.role,
            "kelas": claims.kelas,
        }
    })))
}

#[cfg(test)]
mod tests {
    use bcrypt::{hash, verify, DEFAULT_COST};

    #[test]
    fn hash_password_bisa_diverifikasi() {
        let hashed = hash("rahasia123", DEFAULT_COST).unwrap();
        assert!(verify("rahasia123", &hashed).unwrap());
        assert!(!verify("salah", &hashed).unwrap());
    }

    #[test]
    fn hash_baru_menolak_password_lama() {
        let lama = hash("password-lama", DEFAULT_COST).unwrap();
        let baru = hash("password-baru", DEFAULT_COST).unwrap();
        assert!(verify("password-baru", &baru).unwrap());
        assert!(!verify("password-lama", &baru).unwrap());
        assert!(verify("password-lama", &lama).unwrap());
    }
}
