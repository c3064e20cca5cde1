use serde::{Deserialize, Serialize};

use crate::domain::model::book::Book;
use crate::domain::model::shelf::Shelf;

use super::error::AppError;

/// 表示用フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewFormat {
    Markdown,
    Json,
}

/// 本1冊分のカードDTO
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCard {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub is_complete: bool,
}

impl From<&Book> for BookCard {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id().value(),
            title: book.title().to_string(),
            author: book.author().to_string(),
            year: book.year(),
            is_complete: book.is_complete(),
        }
    }
}

/// 未読・読了の2段に分けた本棚DTO
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub unread: Vec<BookCard>,
    pub finished: Vec<BookCard>,
}

/// 本のリスト → 表示用テキスト
pub struct ShelfRenderer;

impl ShelfRenderer {
    pub fn render(
        books: &[&Book],
        query: Option<&str>,
        format: ViewFormat,
    ) -> Result<String, AppError> {
        match format {
            ViewFormat::Markdown => Ok(Self::render_markdown(books, query)),
            ViewFormat::Json => Self::render_json(books, query),
        }
    }

    /// Markdownに変換する。未読 → 読了の順に並べる。
    pub fn render_markdown(books: &[&Book], query: Option<&str>) -> String {
        let mut buf = String::new();

        match normalize_query(query) {
            Some(q) => buf.push_str(&format!("# Bookshelf: search \"{q}\"\n\n")),
            None => buf.push_str("# Bookshelf\n\n"),
        }

        let (unread, finished) = Shelf::partition(books.iter().copied());
        Self::render_section("Unread", &unread, &mut buf);
        Self::render_section("Finished", &finished, &mut buf);

        buf
    }

    /// JSON文字列に変換する。
    pub fn render_json(books: &[&Book], query: Option<&str>) -> Result<String, AppError> {
        let view = Self::build_view(books, query);
        serde_json::to_string_pretty(&view).map_err(AppError::Render)
    }

    pub fn build_view(books: &[&Book], query: Option<&str>) -> ShelfView {
        let (unread, finished) = Shelf::partition(books.iter().copied());
        ShelfView {
            query: normalize_query(query).map(String::from),
            unread: unread.into_iter().map(BookCard::from).collect(),
            finished: finished.into_iter().map(BookCard::from).collect(),
        }
    }

    /// 1冊分の行。`- [x] Title by Author (1965) [id: 1]`
    pub fn render_line(book: &Book) -> String {
        let check = if book.is_complete() { "x" } else { " " };
        let mut line = format!("- [{check}] {}", book.title());
        if !book.author().is_empty() {
            line.push_str(&format!(" by {}", book.author()));
        }
        match book.year() {
            Some(year) => line.push_str(&format!(" ({year})")),
            None => line.push_str(" (year unknown)"),
        }
        line.push_str(&format!(" [id: {}]", book.id()));
        line
    }

    fn render_section(heading: &str, books: &[&Book], buf: &mut String) {
        buf.push_str(&format!("## {} ({})\n\n", heading, books.len()));
        if books.is_empty() {
            buf.push_str("(none)\n\n");
            return;
        }
        for book in books {
            buf.push_str(&Self::render_line(book));
            buf.push('\n');
        }
        buf.push('\n');
    }
}

/// 空白だけのクエリは「検索なし」と同じ扱い。
fn normalize_query(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|q| !q.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::book::BookDraft;
    use crate::domain::model::id::BookId;

    fn book(id: i64, title: &str, author: &str, year: Option<i32>, done: bool) -> Book {
        Book::new(BookId::from(id), BookDraft::new(title, author, year, done))
    }

    #[test]
    fn line_for_unread_book() {
        let b = book(5, "Dune", "Frank Herbert", Some(1965), false);
        assert_eq!(
            ShelfRenderer::render_line(&b),
            "- [ ] Dune by Frank Herbert (1965) [id: 5]"
        );
    }

    #[test]
    fn line_without_author_or_year() {
        let b = book(6, "Anonymous Notes", "", None, true);
        assert_eq!(
            ShelfRenderer::render_line(&b),
            "- [x] Anonymous Notes (year unknown) [id: 6]"
        );
    }

    #[test]
    fn empty_shelf_renders_placeholders() {
        let md = ShelfRenderer::render_markdown(&[], None);
        assert_eq!(
            md,
            "# Bookshelf\n\n## Unread (0)\n\n(none)\n\n## Finished (0)\n\n(none)\n\n"
        );
    }

    #[test]
    fn blank_query_is_dropped() {
        let view = ShelfRenderer::build_view(&[], Some("   "));
        assert!(view.query.is_none());
        let md = ShelfRenderer::render_markdown(&[], Some("  dune "));
        assert!(md.starts_with("# Bookshelf: search \"dune\""));
    }

    #[test]
    fn json_view_splits_shelves() {
        let a = book(1, "A", "x", Some(1), false);
        let b = book(2, "B", "y", Some(2), true);
        let json = ShelfRenderer::render(&[&a, &b], None, ViewFormat::Json).unwrap();
        let parsed: ShelfView = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.unread.len(), 1);
        assert_eq!(parsed.finished.len(), 1);
        assert_eq!(parsed.finished[0].title, "B");
    }
}
