mod error;
mod models;
mod permissions;
pub mod settings;

pub use error::DomainError;
pub use models::{ArticleId, Comment, CommentId, NewComment};
pub use permissions::{Capabilities, Permission};
pub use settings::Settings;
