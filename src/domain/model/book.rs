use serde::{Deserialize, Serialize};

use super::id::BookId;

/// フォームから受け取る本の可変フィールド一式。
/// 追加・更新・submitの入力として使う。値の検証はしない。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    /// `None` は「数値として読めなかった年」を表す。
    pub year: Option<i32>,
    pub is_complete: bool,
}

impl BookDraft {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: Option<i32>,
        is_complete: bool,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
            is_complete,
        }
    }
}

/// 本棚の1レコード。Shelfが所有し、Shelfを通じて変更する。
///
/// JSON形式: `{"id": 1, "title": "..", "author": "..", "year": 1965, "isComplete": false}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    /// 読めなかった年は `null` として保存される
    year: Option<i32>,
    is_complete: bool,
}

impl Book {
    pub fn new(id: BookId, draft: BookDraft) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            year: draft.year,
            is_complete: draft.is_complete,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// 現在の値をフォーム入力として取り出す（編集開始時のプリフィル用）。
    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            year: self.year,
            is_complete: self.is_complete,
        }
    }

    // --- 内部操作（Shelf経由でのみ呼ばれる） ---

    /// id以外の4フィールドを上書きする。
    pub(crate) fn apply(&mut self, draft: BookDraft) {
        self.title = draft.title;
        self.author = draft.author;
        self.year = draft.year;
        self.is_complete = draft.is_complete;
    }

    pub(crate) fn toggle_complete(&mut self) {
        self.is_complete = !self.is_complete;
    }

    /// タイトルに `needle`（小文字化済み）が含まれるか。
    pub(crate) fn title_contains(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
    }
}

/// フォームの年入力を整数に変換する。
///
/// 先頭の空白を読み飛ばし、符号と続く数字だけを解釈する（`"1965年"` → 1965）。
/// 数字が1つもない場合や `i32` に収まらない場合は `None`。
pub fn parse_year(input: &str) -> Option<i32> {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}
