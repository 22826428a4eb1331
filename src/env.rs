use std::path::PathBuf;

lazy_static! {
    /// Logging configuration. Example: `info`
    pub static ref RUST_LOG: String =
        dotenvy::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    /// Path of the JSON document holding all persistent data.
    pub static ref DB_PATH: PathBuf = dotenvy::var("DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/db.json"));

    /// Socket address the server listens on.
    pub static ref BIND_ADDR: String =
        dotenvy::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
}
