use std::fmt;

use crate::DomainError;

pub type CommentId = i64;

/// Opaque identifier of the page a comment thread belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(s: impl Into<String>) -> Result<Self, DomainError> {
        let s = s.into();
        if s.is_empty() {
            return Err(DomainError::EmptyArticleId);
        }
        Ok(Self(s))
    }

    pub fn new_unchecked(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored comment. Author and body are untrusted input and are never
/// changed after insertion; only `needs_moderation` may flip, and only to
/// `false`. Only comments without the flag are shown publicly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub article_id: ArticleId,
    pub author: String,
    pub body: String,
    pub needs_moderation: bool,
}

/// A comment that has not been assigned an id yet. The moderation flag is
/// fixed here, at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub article_id: ArticleId,
    pub author: String,
    pub body: String,
    pub needs_moderation: bool,
}
