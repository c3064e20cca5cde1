//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use bookshelf_mcp::application::service::BookStore;
use bookshelf_mcp::domain::model::book::{Book, BookDraft};
use bookshelf_mcp::domain::model::id::BookId;
use bookshelf_mcp::domain::repository::{ShelfRepository, STORAGE_KEY};

// =============================================================================
// InMemoryRepo: テスト用キー・バリューストア
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InMemoryError {
    #[error("in-memory store: save refused")]
    SaveRefused,
    #[error("in-memory store: {0}")]
    Json(#[from] serde_json::Error),
}

/// ファイルI/O不要のインメモリリポジトリ。
/// ブラウザのlocalStorageと同じく、固定キーにJSON文字列を置く。
pub struct InMemoryRepo {
    store: RefCell<HashMap<String, String>>,
    fail_saves: Cell<bool>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            store: RefCell::new(HashMap::new()),
            fail_saves: Cell::new(false),
        }
    }

    /// 生のJSONを直接置く（壊れたデータの再現用）。
    pub fn with_raw(json: &str) -> Self {
        let repo = Self::new();
        repo.store
            .borrow_mut()
            .insert(STORAGE_KEY.to_string(), json.to_string());
        repo
    }

    pub fn raw(&self) -> Option<String> {
        self.store.borrow().get(STORAGE_KEY).cloned()
    }

    /// 以降のsaveを失敗させる。
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }
}

impl ShelfRepository for &InMemoryRepo {
    type Error = InMemoryError;

    fn load(&self) -> Result<Vec<Book>, Self::Error> {
        let store = self.store.borrow();
        match store.get(STORAGE_KEY) {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, books: &[Book]) -> Result<(), Self::Error> {
        if self.fail_saves.get() {
            return Err(InMemoryError::SaveRefused);
        }
        let json = serde_json::to_string(books)?;
        self.store.borrow_mut().insert(STORAGE_KEY.to_string(), json);
        Ok(())
    }
}

// =============================================================================
// TestShelf: 固定IDのテスト用本棚
// =============================================================================

/// 標準的なテスト用の本棚:
/// ```text
/// 1. Dune              (Frank Herbert, 1965, unread)
/// 2. Foundation        (Isaac Asimov, 1951, finished)
/// 3. Children of Dune  (Frank Herbert, 1976, unread)
/// ```
pub fn standard_books() -> Vec<Book> {
    vec![
        Book::new(
            BookId::from(1),
            BookDraft::new("Dune", "Frank Herbert", Some(1965), false),
        ),
        Book::new(
            BookId::from(2),
            BookDraft::new("Foundation", "Isaac Asimov", Some(1951), true),
        ),
        Book::new(
            BookId::from(3),
            BookDraft::new("Children of Dune", "Frank Herbert", Some(1976), false),
        ),
    ]
}

/// 本をInMemoryRepoに保存してからBookStoreを開く。
pub fn store_with_books<'a>(
    repo: &'a InMemoryRepo,
    books: &[Book],
) -> BookStore<&'a InMemoryRepo> {
    repo.save(books).unwrap();
    BookStore::open(repo).unwrap()
}

pub fn titles(books: &[&Book]) -> Vec<String> {
    books.iter().map(|b| b.title().to_string()).collect()
}

// =============================================================================
// Assertion helpers
// =============================================================================

/// 結果がErrで、メッセージに指定文字列を含むことをassert。
#[allow(dead_code)]
pub fn assert_error_contains<T>(result: Result<T, impl std::fmt::Display>, expected: &str) {
    match result {
        Err(e) => {
            let msg = e.to_string();
            assert!(
                msg.contains(expected),
                "Expected error containing '{expected}', got: '{msg}'"
            );
        }
        Ok(_) => panic!("Expected error containing '{expected}', got Ok"),
    }
}
