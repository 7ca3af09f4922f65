pub mod aspirasi_controller;
pub mod auth_controller;
pub mod kategori_controller;
pub mod progres_controller;
pub mod stats_controller;
pub mod umpan_balik_controller;
pub mod user_controller;
