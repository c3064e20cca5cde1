//! Runtime configuration.
//!
//! The storage location comes from (in order) the first CLI argument, the
//! `BOOKSHELF_PATH` environment variable, or the current directory.

use std::path::{Path, PathBuf};

use crate::domain::repository::STORAGE_KEY;

pub const STORAGE_PATH_ENV: &str = "BOOKSHELF_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON file holding the whole bookshelf.
    pub storage_path: PathBuf,
}

impl Config {
    /// Reads the process arguments and environment.
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::args().nth(1),
            std::env::var(STORAGE_PATH_ENV).ok(),
        )
    }

    /// A `.json` path is used as-is; anything else is treated as a directory
    /// that receives the fixed storage key file.
    pub fn resolve(arg: Option<String>, env: Option<String>) -> Self {
        let raw = arg
            .or(env)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ".".to_string());
        Self {
            storage_path: storage_file(Path::new(&raw)),
        }
    }
}

fn storage_file(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => path.to_path_buf(),
        _ => path.join(format!("{STORAGE_KEY}.json")),
    }
}
