use tracing::{debug, info, warn};

use crate::domain::model::book::{Book, BookDraft};
use crate::domain::model::id::BookId;
use crate::domain::model::shelf::{Outcome, Shelf};
use crate::domain::repository::ShelfRepository;

use super::error::AppError;

/// フォーム送信の結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// 編集中でなかったので新規追加した
    Created(Book),
    /// 編集中の本を更新した（対象が消えていれば NotFound）
    Updated { id: BookId, outcome: Outcome },
}

/// 本棚に対するユースケース。
/// 起動時に1度loadし、以降はメモリ上のShelfを正とする。
/// 変更が適用されるたびにコレクション全体をsaveする。
pub struct BookStore<R: ShelfRepository> {
    repo: R,
    shelf: Shelf,
    /// 編集中の本（フォームが「更新」モードのとき Some）
    editing: Option<BookId>,
}

impl<R: ShelfRepository> BookStore<R> {
    /// 保存済みの本棚を読み込んで開く。壊れたデータはエラーとして返す。
    pub fn open(repo: R) -> Result<Self, AppError> {
        let books = repo.load().map_err(|e| AppError::Storage(Box::new(e)))?;
        let shelf = Shelf::from_books(books)?;
        info!(books = shelf.len(), "bookshelf loaded");
        Ok(Self {
            repo,
            shelf,
            editing: None,
        })
    }

    /// 本を追加して永続化する。入力は検証しない。
    pub fn create(&mut self, draft: BookDraft) -> Result<Book, AppError> {
        let book = self.shelf.add(draft).clone();
        info!(id = %book.id(), title = book.title(), "book created");
        self.persist()?;
        Ok(book)
    }

    /// 本の4フィールドを上書きする。
    pub fn update(&mut self, id: BookId, draft: BookDraft) -> Result<Outcome, AppError> {
        let outcome = self.shelf.update(id, draft);
        self.commit("update", id, outcome)
    }

    /// 本を削除する。編集中の本なら編集状態も解除する。
    pub fn delete(&mut self, id: BookId) -> Result<Outcome, AppError> {
        let outcome = self.shelf.remove(id);
        if outcome.is_applied() && self.editing == Some(id) {
            self.editing = None;
        }
        self.commit("delete", id, outcome)
    }

    /// 読了フラグを反転する。
    pub fn toggle_complete(&mut self, id: BookId) -> Result<Outcome, AppError> {
        let outcome = self.shelf.toggle_complete(id);
        self.commit("toggle", id, outcome)
    }

    pub fn find_by_id(&self, id: BookId) -> Option<&Book> {
        self.shelf.get(id)
    }

    pub fn search(&self, query: &str) -> Vec<&Book> {
        self.shelf.search(query)
    }

    /// 全件（初期表示用）。
    pub fn books(&self) -> &[Book] {
        self.shelf.books()
    }

    // --- 編集フロー ---

    /// 編集を開始する。対象があれば編集中にして、その本を返す。
    pub fn begin_edit(&mut self, id: BookId) -> Option<&Book> {
        let book = self.shelf.get(id)?;
        self.editing = Some(id);
        debug!(%id, "editing started");
        Some(book)
    }

    pub fn cancel_edit(&mut self) {
        if let Some(id) = self.editing.take() {
            debug!(%id, "editing cancelled");
        }
    }

    pub fn editing(&self) -> Option<BookId> {
        self.editing
    }

    /// フォーム送信。編集中なら更新して編集状態を解除し、そうでなければ追加する。
    pub fn submit(&mut self, draft: BookDraft) -> Result<Submission, AppError> {
        match self.editing.take() {
            Some(id) => {
                let outcome = self.update(id, draft)?;
                Ok(Submission::Updated { id, outcome })
            }
            None => self.create(draft).map(Submission::Created),
        }
    }

    // --- private ---

    fn commit(
        &self,
        op: &'static str,
        id: BookId,
        outcome: Outcome,
    ) -> Result<Outcome, AppError> {
        match outcome {
            Outcome::Applied => {
                info!(op, %id, "book changed");
                self.persist()?;
            }
            Outcome::NotFound => debug!(op, %id, "no book with this id; nothing to do"),
        }
        Ok(outcome)
    }

    fn persist(&self) -> Result<(), AppError> {
        self.repo.save(self.shelf.books()).map_err(|e| {
            warn!(error = %e, "failed to persist bookshelf");
            AppError::Storage(Box::new(e))
        })?;
        debug!(books = self.shelf.len(), "bookshelf persisted");
        Ok(())
    }
}
