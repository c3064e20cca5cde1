use super::model::book::Book;

/// 本棚全体を保存する固定キー。
pub const STORAGE_KEY: &str = "BOOKSHELF_APP";

/// 永続化の抽象。Infra層が実装する。
/// 常にコレクション全体を読み書きする（差分保存はしない）。
pub trait ShelfRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// 保存済みの本を挿入順で返す。未保存なら空。
    fn load(&self) -> Result<Vec<Book>, Self::Error>;
    fn save(&self, books: &[Book]) -> Result<(), Self::Error>;
}
