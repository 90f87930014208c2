use domain::{ArticleId, Comment};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlComment {
    pub id: i64,
    pub article: String,
    pub author: String,
    pub body: String,
    #[sqlx(rename = "needsMod")]
    pub needs_mod: bool,
}

impl From<SqlComment> for Comment {
    fn from(sql: SqlComment) -> Self {
        Comment {
            id: sql.id,
            article_id: ArticleId::new_unchecked(sql.article),
            author: sql.author,
            body: sql.body,
            needs_moderation: sql.needs_mod,
        }
    }
}
