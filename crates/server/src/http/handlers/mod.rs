pub mod admin;
pub mod comments;

use domain::CommentId;

pub const NEW_COMMENT_PATH: &str = "/new-comment";
pub const SETTINGS_PATH: &str = "/settings";

pub fn approve_path(id: CommentId) -> String {
    format!("/approve/{}", id)
}

pub fn delete_path(id: CommentId) -> String {
    format!("/delete/{}", id)
}
