use std::path::{Path, PathBuf};

use crate::domain::model::book::Book;
use crate::domain::repository::{ShelfRepository, STORAGE_KEY};

#[derive(Debug, thiserror::Error)]
pub enum JsonStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSONファイルによるShelfRepository実装。
/// 本棚全体 = 1 JSON配列 = 1ファイル。
pub struct JsonShelfRepository {
    path: PathBuf,
}

impl JsonShelfRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// ディレクトリ内の固定キーファイル（`BOOKSHELF_APP.json`）を使う。
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{STORAGE_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ShelfRepository for JsonShelfRepository {
    type Error = JsonStoreError;

    fn load(&self) -> Result<Vec<Book>, Self::Error> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let books: Vec<Book> = serde_json::from_str(&content)?;
        Ok(books)
    }

    /// 同じディレクトリの`<name>.tmp`に書いてからrenameで差し替える。
    /// 書き込み途中で落ちても既存のスナップショットは壊れない。
    fn save(&self, books: &[Book]) -> Result<(), Self::Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(books)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, &content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
