use std::fs;
use std::path::PathBuf;

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const STORE_FILE_NAME: &str = "invoice_data.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    pub data_root: String,
}

fn config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "factura", "factura") {
        return proj_dirs.config_dir().join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

pub fn load_settings() -> Option<Settings> {
    let path = config_path();
    if !path.exists() {
        return None;
    }
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(settings).expect("settings are serializable");
    fs::write(&path, content)?;
    Ok(())
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~')
        && let Some(base_dirs) = BaseDirs::new()
    {
        let home = base_dirs.home_dir().to_string_lossy();
        return path.replacen('~', &home, 1);
    }
    path.to_string()
}

/// Resolves the store file location: an explicit flag wins, then the
/// configured data root, then the current directory.
pub fn store_path(flag: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Some(settings) = load_settings() {
        return PathBuf::from(expand_home_dir(&settings.data_root)).join(STORE_FILE_NAME);
    }
    PathBuf::from(STORE_FILE_NAME)
}
