use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("articleId not set")]
    EmptyArticleId,
    #[error("unknown permission: {0}")]
    UnknownPermission(String),
}
