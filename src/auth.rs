use actix_web::HttpRequest;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::User;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_id: i32,
    pub role: String,
    pub nama_user: String,
    pub kelas: Option<String>,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn is_siswa(&self) -> bool {
        self.role == "siswa"
    }
}

pub fn generate_jwt(user: &User) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let now = Utc::now();
    let claims = Claims {
        sub: user.username.clone(),
        user_id: user.id,
        role: user.role.clone(),
        nama_user: user.nama_lengkap.clone(),
        kelas: user.kelas.clone(),
        exp: (now + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify_jwt(req: &HttpRequest) -> Result<Claims, actix_web::Error> {
    let token = req
        .cookie("access_token")
        .ok_or_else(|| {
            log::error!("No access_token cookie found in request to {}", req.path());
            actix_web::error::ErrorUnauthorized("Token tidak ditemukan")
        })?
        .value()
        .to_string();

    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        log::error!("JWT verification failed: {:?}", e);
        actix_web::error::ErrorUnauthorized("Token tidak valid atau kedaluwarsa")
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;
    use chrono::NaiveDateTime;

    fn dummy_user() -> User {
        User {
            id: 7,
            username: "budi".into(),
            password: "$2b$12$abcdefghijklmnopqrstuv".into(),
            nama_lengkap: "Budi Santoso".into(),
            role: "siswa".into(),
            kelas: Some("XI IPA 2".into()),
            email: None,
            created_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn jwt_round_trip_menjaga_claims() {
        std::env::set_var("JWT_SECRET", "rahasia-test");
        let token = generate_jwt(&dummy_user()).unwrap();

        let req = TestRequest::default()
            .cookie(Cookie::new("access_token", token))
            .to_http_request();
        let claims = verify_jwt(&req).unwrap();

        assert_eq!(claims.sub, "budi");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, "siswa");
        assert_eq!(claims.kelas.as_deref(), Some("XI IPA 2"));
        assert!(claims.is_siswa());
        assert!(!claims.is_admin());
    }

    #[test]
    fn token_kedaluwarsa_ditolak() {
        std::env::set_var("JWT_SECRET", "rahasia-test");
        let claims = Claims {
            sub: "budi".into(),
            user_id: 7,
            role: "siswa".into(),
            nama_user: "Budi Santoso".into(),
            kelas: None,
            exp: (Utc::now() - chrono::Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"rahasia-test"),
        )
        .unwrap();

        let req = TestRequest::default()
            .cookie(Cookie::new("access_token", token))
            .to_http_request();
        assert!(verify_jwt(&req).is_err());
    }

    #[test]
    fn request_tanpa_cookie_ditolak() {
        std::env::set_var("JWT_SECRET", "rahasia-test");
        let req = TestRequest::default().to_http_request();
        assert!(verify_jwt(&req).is_err());
    }
}
