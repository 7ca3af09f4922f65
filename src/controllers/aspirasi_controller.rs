use actix_web::{get, post, put, web, Error, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth;
use crate::models::aspirasi::{
    AspirasiDetail, AspirasiFilter, AspirasiForm, AspirasiListItem, StatusForm,
};

// persentase_progres diambil dari baris progres yang paling baru (bukan MAX):
// urut created_at menurun, seri dipecah dengan id terbesar.
const LIST_SELECT: &str = "SELECT
        a.id, a.user_id, a.kategori_id, a.judul, a.deskripsi, a.lokasi,
        a.tingkat_urgensi, a.status, a.tanggal_pengaduan, a.foto_bukti,
        a.created_at, a.updated_at,
        u.nama_lengkap AS nama_siswa,
        u.kelas,
        k.nama_kategori,
        (SELECT COUNT(*) FROM umpan_balik ub WHERE ub.aspirasi_id = a.id) AS jumlah_umpan_balik,
        (SELECT p.persentase FROM progres_perbaikan p
         WHERE p.aspirasi_id = a.id
         ORDER BY p.created_at DESC, p.id DESC
         LIMIT 1) AS persentase_progres
    FROM aspirasi a
    LEFT JOIN users u ON a.user_id = u.id
    LEFT JOIN kategori k ON a.kategori_id = k.id";

// Komposisi filter AND; filter yang tidak dikirim tidak ikut sama sekali.
// Siswa SELALU dikunci ke aspirasi miliknya sendiri; user_id dari query
// string hanya dihormati untuk admin.
fn filter_conditions(is_siswa: bool, f: &AspirasiFilter) -> Vec<&'static str> {
    let mut conds: Vec<&'static str> = Vec::new();

    if is_siswa {
        conds.push("a.user_id = ?");
    }
    if f.tanggal.is_some() {
        conds.push("DATE(a.tanggal_pengaduan) = ?");
    }
    if f.bulan.is_some() && f.tahun.is_some() {
        conds.push("MONTH(a.tanggal_pengaduan) = ?");
        conds.push("YEAR(a.tanggal_pengaduan) = ?");
    } else if f.tahun.is_some() {
        conds.push("YEAR(a.tanggal_pengaduan) = ?");
    }
    if !is_siswa && f.user_id.is_some() {
        conds.push("a.user_id = ?");
    }
    if f.kategori_id.is_some() {
        conds.push("a.kategori_id = ?");
    }
    if f.status.is_some() {
        conds.push("a.status = ?");
    }

    conds
}

#[get("/api/aspirasi")]
pub async fn get_aspirasi_list(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    query: web::Query<AspirasiFilter>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    let is_siswa = claims.is_siswa();

    let conds = filter_conditions(is_siswa, &query);
    let where_sql = if conds.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conds.join(" AND "))
    };
    let sql = format!("{}{} ORDER BY a.created_at DESC", LIST_SELECT, where_sql);

    // Urutan bind harus sama dengan urutan kondisi di filter_conditions.
    let mut q = sqlx::query_as::<_, AspirasiListItem>(&sql);
    if is_siswa {
        q = q.bind(claims.user_id);
    }
    if let Some(tanggal) = &query.tanggal {
        q = q.bind(tanggal);
    }
    if let (Some(bulan), Some(tahun)) = (query.bulan, query.tahun) {
        q = q.bind(bulan).bind(tahun);
    } else if let Some(tahun) = query.tahun {
        q = q.bind(tahun);
    }
    if !is_siswa {
        if let Some(user_id) = query.user_id {
            q = q.bind(user_id);
        }
    }
    if let Some(kategori_id) = query.kategori_id {
        q = q.bind(kategori_id);
    }
    if let Some(status) = &query.status {
        q = q.bind(status);
    }

    let rows = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        log::error!("Gagal mengambil daftar aspirasi: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal mengambil data aspirasi")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "data": rows })))
}

#[get("/api/aspirasi/{id}")]
pub async fn get_aspirasi_detail(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    let id = path.into_inner();

    let aspirasi = sqlx::query_as::<_, AspirasiDetail>(
        "SELECT
            a.id, a.user_id, a.kategori_id, a.judul, a.deskripsi, a.lokasi,
            a.tingkat_urgensi, a.status, a.tanggal_pengaduan, a.foto_bukti,
            a.created_at, a.updated_at,
            u.nama_lengkap AS nama_siswa,
            u.kelas,
            k.nama_kategori
         FROM aspirasi a
         LEFT JOIN users u ON a.user_id = u.id
         LEFT JOIN kategori k ON a.kategori_id = k.id
         WHERE a.id = ?",
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("Gagal mengambil detail aspirasi {}: {:?}", id, e);
        actix_web::error::ErrorInternalServerError("Gagal mengambil detail aspirasi")
    })?
    .ok_or_else(|| actix_web::error::ErrorNotFound("Aspirasi tidak ditemukan"))?;

    if claims.is_siswa() && aspirasi.user_id != claims.user_id {
        return Err(actix_web::error::ErrorForbidden(
            "Anda tidak memiliki akses ke aspirasi ini",
        ));
    }

    Ok(HttpResponse::Ok().json(json!({ "data": aspirasi })))
}

#[post("/api/aspirasi")]
pub async fn create_aspirasi(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AspirasiForm>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    let data = payload.into_inner();

    let kategori_id = data.kategori_id;
    let judul = data.judul.filter(|s| !s.trim().is_empty());
    let deskripsi = data.deskripsi.filter(|s| !s.trim().is_empty());

    let (kategori_id, judul, deskripsi) = match (kategori_id, judul, deskripsi) {
        (Some(k), Some(j), Some(d)) => (k, j, d),
        _ => {
            return Err(actix_web::error::ErrorBadRequest(
                "Kategori, judul, dan deskripsi harus diisi",
            ));
        }
    };

    // user_id selalu dari session, bukan dari client; tanggal_pengaduan
    // selalu tanggal server saat insert.
    let result = sqlx::query(
        "INSERT INTO aspirasi
            (user_id, kategori_id, judul, deskripsi, lokasi, tingkat_urgensi, tanggal_pengaduan)
         VALUES (?, ?, ?, ?, ?, ?, CURDATE())",
    )
    .bind(claims.user_id)
    .bind(kategori_id)
    .bind(&judul)
    .bind(&deskripsi)
    .bind(&data.lokasi)
    .bind(data.tingkat_urgensi.as_deref().unwrap_or("sedang"))
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("Gagal membuat aspirasi: {:?}", e);
        actix_web::error::ErrorInternalServerError("Gagal membuat aspirasi")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Aspirasi berhasil dibuat",
        "id": result.last_insert_id(),
    })))
}

#[put("/api/aspirasi")]
pub async fn update_aspirasi_status(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    payload: web::Json<StatusForm>,
) -> Result<impl Responder, Error> {
    let claims = auth::verify_jwt(&req)?;
    if !claims.is_admin() {
        return Err(actix_web::error::ErrorForbidden(
            "Hanya admin yang dapat mengubah status",
        ));
    }

    let data = payload.into_inner();
    let (id, status) = match (data.id, data.status.filter(|s| !s.trim().is_empty())) {
        (Some(id), Some(status)) => (id, status),
        _ => {
            return Err(actix_web::error::ErrorBadRequest("ID dan status harus diisi"));
        }
    };

    // Nilai status tidak divalidasi terhadap enum di sini; form layer yang
    // menentukan pilihannya. Nilai di luar enum akan ditolak MySQL.
    let result = sqlx::query("UPDATE aspirasi SET status = ? WHERE id = ?")
        .bind(&status)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            log::error!("Gagal mengupdate status aspirasi {}: {:?}", id, e);
            actix_web::error::ErrorInternalServerError("Gagal mengupdate status")
        })?;

    if result.rows_affected() == 0 {
        return Err(actix_web::error::ErrorNotFound("Aspirasi tidak ditemukan"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Status berhasil diupdate" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_filter() -> AspirasiFilter {
        AspirasiFilter {
            tanggal: None,
            bulan: None,
            tahun: None,
            user_id: None,
            kategori_id: None,
            status: None,
        }
    }

    #[test]
    fn siswa_selalu_dikunci_ke_miliknya() {
        let conds = filter_conditions(true, &empty_filter());
        assert_eq!(conds, vec!["a.user_id = ?"]);
    }

    #[test]
    fn filter_user_id_diabaikan_untuk_siswa() {
        let f = AspirasiFilter {
            user_id: Some(99),
            status: Some("pending".into()),
            ..empty_filter()
        };
        let conds = filter_conditions(true, &f);
        // Satu-satunya predikat user_id adalah milik session, ditaruh paling depan.
        assert_eq!(conds, vec!["a.user_id = ?", "a.status = ?"]);
    }

    #[test]
    fn admin_boleh_memfilter_user_id() {
        let f = AspirasiFilter {
            user_id: Some(3),
            ..empty_filter()
        };
        assert_eq!(filter_conditions(false, &f), vec!["a.user_id = ?"]);
    }

    #[test]
    fn admin_tanpa_filter_tidak_punya_kondisi() {
        assert!(filter_conditions(false, &empty_filter()).is_empty());
    }

    #[test]
    fn bulan_hanya_berlaku_bersama_tahun() {
        let hanya_bulan = AspirasiFilter {
            bulan: Some(3),
            ..empty_filter()
        };
        assert!(filter_conditions(false, &hanya_bulan).is_empty());

        let keduanya = AspirasiFilter {
            bulan: Some(3),
            tahun: Some(2025),
            ..empty_filter()
        };
        assert_eq!(
            filter_conditions(false, &keduanya),
            vec![
                "MONTH(a.tanggal_pengaduan) = ?",
                "YEAR(a.tanggal_pengaduan) = ?"
            ]
        );

        let hanya_tahun = AspirasiFilter {
            tahun: Some(2025),
            ..empty_filter()
        };
        assert_eq!(
            filter_conditions(false, &hanya_tahun),
            vec!["YEAR(a.tanggal_pengaduan) = ?"]
        );
    }

    #[test]
    fn semua_filter_digabung_dengan_and() {
        let f = AspirasiFilter {
            tanggal: Some("2025-03-01".into()),
            kategori_id: Some(2),
            status: Some("diproses".into()),
            ..empty_filter()
        };
        let conds = filter_conditions(true, &f);
        assert_eq!(conds.len(), 4);
        let sql = conds.join(" AND ");
        assert!(sql.starts_with("a.user_id = ?"));
        assert!(sql.contains("DATE(a.tanggal_pengaduan) = ?"));
    }
}
