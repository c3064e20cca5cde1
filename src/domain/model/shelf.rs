use std::collections::HashSet;

use super::book::{Book, BookDraft};
use super::id::BookId;
use crate::domain::error::DomainError;

/// IDを指定する操作の結果。対象が無い場合もエラーにはしない。
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    NotFound,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// 本棚: 集約ルート。挿入順を保った本のリストで、IDは常に一意。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shelf {
    books: Vec<Book>,
}

impl Shelf {
    pub fn new() -> Self {
        Self::default()
    }

    /// 永続化済みのリストから復元する。IDの重複があれば拒否する。
    pub fn from_books(books: Vec<Book>) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(books.len());
        for book in &books {
            if !seen.insert(book.id()) {
                return Err(DomainError::DuplicateId(book.id()));
            }
        }
        Ok(Self { books })
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id() == id)
    }

    /// 末尾に追加し、追加した本を返す。
    pub fn add(&mut self, draft: BookDraft) -> &Book {
        let id = self.next_id();
        self.books.push(Book::new(id, draft));
        &self.books[self.books.len() - 1]
    }

    /// 4フィールドを上書きする。位置とIDは変えない。
    pub fn update(&mut self, id: BookId, draft: BookDraft) -> Outcome {
        match self.get_mut(id) {
            Some(book) => {
                book.apply(draft);
                Outcome::Applied
            }
            None => Outcome::NotFound,
        }
    }

    pub fn remove(&mut self, id: BookId) -> Outcome {
        match self.books.iter().position(|b| b.id() == id) {
            Some(index) => {
                self.books.remove(index);
                Outcome::Applied
            }
            None => Outcome::NotFound,
        }
    }

    pub fn toggle_complete(&mut self, id: BookId) -> Outcome {
        match self.get_mut(id) {
            Some(book) => {
                book.toggle_complete();
                Outcome::Applied
            }
            None => Outcome::NotFound,
        }
    }

    /// タイトルの部分一致検索（大文字小文字を区別しない）。
    /// クエリは前後の空白を除いてから使い、空なら全件を返す。
    pub fn search(&self, query: &str) -> Vec<&Book> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.books.iter().collect();
        }
        self.books
            .iter()
            .filter(|b| b.title_contains(&needle))
            .collect()
    }

    /// 未読（未完了）と読了に分ける。どちらも元の順序を保つ。
    pub fn partition<'a>(
        books: impl IntoIterator<Item = &'a Book>,
    ) -> (Vec<&'a Book>, Vec<&'a Book>) {
        let (complete, unread): (Vec<&Book>, Vec<&Book>) =
            books.into_iter().partition(|b| b.is_complete());
        (unread, complete)
    }

    /// 次に割り当てるID。
    ///
    /// 現在時刻（ミリ秒）を基本とし、既存IDの最大値以下なら最大値+1にずらす。
    /// 同一ミリ秒内の連続追加や時計の巻き戻りでも重複しない。
    /// 最大値が`i64::MAX`なら、上から順に空いているIDを使う。
    fn next_id(&self) -> BookId {
        let now = BookId::now();
        let max = match self.books.iter().map(|b| b.id()).max() {
            Some(max) if max >= now => max,
            _ => return now,
        };
        if let Some(id) = max.checked_succ() {
            return id;
        }
        let used: HashSet<BookId> = self.books.iter().map(|b| b.id()).collect();
        // 本の数+1回以内に必ず見つかる
        (i64::MIN..=i64::MAX)
            .rev()
            .map(BookId::from)
            .find(|id| !used.contains(id))
            .unwrap_or(now)
    }

    fn get_mut(&mut self, id: BookId) -> Option<&mut Book> {
        self.books.iter_mut().find(|b| b.id() == id)
    }
}
