use crate::{models::SqlComment, Db};
use domain::{ArticleId, Comment, CommentId, NewComment};

impl Db {
    /// Appends a comment and returns the id the database assigned to it.
    pub async fn insert_comment(&self, c: &NewComment) -> anyhow::Result<CommentId> {
        let result = sqlx::query(
            r#"
            INSERT INTO comments (article, author, body, needsMod)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(c.article_id.as_str())
        .bind(&c.author)
        .bind(&c.body)
        .bind(c.needs_moderation)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn list_published(&self, article_id: &ArticleId) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, SqlComment>(
            r#"
            SELECT id, article, author, body, needsMod
            FROM comments
            WHERE article = ? AND needsMod = 0
            ORDER BY id ASC
            "#,
        )
        .bind(article_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_all_comments(&self) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, SqlComment>(
            r#"
            SELECT id, article, author, body, needsMod
            FROM comments
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Clears the moderation flag. Returns whether a row was touched; an
    /// unknown id is not an error.
    pub async fn approve_comment(&self, id: CommentId) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE comments SET needsMod = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_comment(&self, id: CommentId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::Db;
    use domain::{ArticleId, NewComment};

    fn new_comment(article: &str, author: &str, needs_moderation: bool) -> NewComment {
        NewComment {
            article_id: ArticleId::new(article).unwrap(),
            author: author.to_string(),
            body: format!("comment by {author}"),
            needs_moderation,
        }
    }

    #[tokio::test]
    async fn ids_are_monotonic() {
        let db = Db::new("sqlite::memory:").await.unwrap();
        let a = db.insert_comment(&new_comment("a1", "ann", false)).await.unwrap();
        let b = db.insert_comment(&new_comment("a1", "bob", false)).await.unwrap();
        assert!(b > a);

        // deleting the newest row must not make its id reusable
        db.delete_comment(b).await.unwrap();
        let c = db.insert_comment(&new_comment("a1", "cat", false)).await.unwrap();
        assert!(c > b);
    }

    #[tokio::test]
    async fn published_listing_filters_by_article_and_flag() {
        let db = Db::new("sqlite::memory:").await.unwrap();
        db.insert_comment(&new_comment("a1", "ann", false)).await.unwrap();
        db.insert_comment(&new_comment("a1", "bob", true)).await.unwrap();
        db.insert_comment(&new_comment("a2", "cat", false)).await.unwrap();
        db.insert_comment(&new_comment("a1", "dan", false)).await.unwrap();

        let a1 = ArticleId::new("a1").unwrap();
        let authors: Vec<_> = db
            .list_published(&a1)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.author)
            .collect();
        assert_eq!(authors, vec!["ann", "dan"]);

        let all = db.list_all_comments().await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all[1].needs_moderation);
        assert_eq!(all[2].article_id.as_str(), "a2");
    }

    #[tokio::test]
    async fn approve_and_delete_unknown_ids_are_noops() {
        let db = Db::new("sqlite::memory:").await.unwrap();
        let id = db.insert_comment(&new_comment("a1", "ann", true)).await.unwrap();

        assert!(!db.approve_comment(id + 100).await.unwrap());
        assert!(!db.delete_comment(id + 100).await.unwrap());

        let all = db.list_all_comments().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].needs_moderation);

        assert!(db.approve_comment(id).await.unwrap());
        assert!(!db.list_all_comments().await.unwrap()[0].needs_moderation);

        assert!(db.delete_comment(id).await.unwrap());
        assert!(!db.delete_comment(id).await.unwrap());
        assert!(db.list_all_comments().await.unwrap().is_empty());
    }
}
