pub mod aspirasi;
pub mod kategori;
pub mod progres;
pub mod umpan_balik;
pub mod user;
