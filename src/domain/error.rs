use super::model::id::BookId;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("duplicate book id in collection: {0}")]
    DuplicateId(BookId),
}
