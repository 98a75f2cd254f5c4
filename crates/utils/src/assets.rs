use std::path::PathBuf;

use directories::ProjectDirs;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");
pub const ASSET_DIR_ENV: &str = "PENDIENTES_ASSET_DIR";

/// Directory holding the SQLite database and `config.json`.
///
/// `PENDIENTES_ASSET_DIR` wins when set. Debug builds fall back to
/// `dev_assets/` at the workspace root, release builds to the platform data dir.
pub fn asset_dir() -> PathBuf {
    if let Ok(override_dir) = std::env::var(ASSET_DIR_ENV) {
        let override_dir = override_dir.trim();
        if !override_dir.is_empty() {
            return PathBuf::from(override_dir);
        }
    }

    if cfg!(debug_assertions) {
        return PathBuf::from(PROJECT_ROOT).join("../../dev_assets");
    }

    ProjectDirs::from("com", "pendientes", "pendientes")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".pendientes"))
    // ✔ macOS → ~/Library/Application Support/com.pendientes.pendientes
    // ✔ Linux → ~/.local/share/pendientes   (respects XDG_DATA_HOME)
    // ✔ Windows → %APPDATA%\pendientes\pendientes
}

/// Same as [`asset_dir`], creating the directory when missing.
pub fn ensure_asset_dir() -> std::io::Result<PathBuf> {
    let path = asset_dir();
    if !path.exists() {
        std::fs::create_dir_all(&path)?;
    }
    Ok(path)
}

pub fn config_path() -> PathBuf {
    asset_dir().join("config.json")
}

pub fn database_path() -> PathBuf {
    asset_dir().join("pendientes.sqlite")
}
