//! Comment lifecycle.
//!
//! ```text
//! submit ──► Pending ──approve──► Published
//!    └──────────────────────────► Published
//! Pending | Published ──delete──► (gone)
//! ```
//!
//! Whether a comment starts out pending is decided once, at submission,
//! and stored with the comment. Later settings changes never touch stored
//! comments.

use domain::{settings, ArticleId, Comment, CommentId, NewComment, Settings};
use storage::Db;
use tracing::info;

pub struct Submission {
    pub article_id: ArticleId,
    pub author: String,
    pub body: String,
}

pub struct Thread {
    pub comments: Vec<Comment>,
    pub settings: Settings,
}

/// Stateless coordinator over the settings and comment stores. Cheap to
/// build for every request.
pub struct Moderation<'a> {
    db: &'a Db,
}

impl<'a> Moderation<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    /// Stores a new comment. `forced` overrides the `require-moderation`
    /// setting when the caller's posting permission dictates the outcome.
    pub async fn submit(
        &self,
        submission: Submission,
        forced: Option<bool>,
    ) -> anyhow::Result<CommentId> {
        let needs_moderation = match forced {
            Some(flag) => flag,
            None => {
                let value = self.db.get_setting(settings::REQUIRE_MODERATION).await?;
                settings::parse_flag(&value)
            }
        };

        let id = self
            .db
            .insert_comment(&NewComment {
                article_id: submission.article_id,
                author: submission.author,
                body: submission.body,
                needs_moderation,
            })
            .await?;

        info!("Stored comment {} (needs moderation: {})", id, needs_moderation);
        Ok(id)
    }

    /// Published comments of one article plus the flags the embedding page
    /// renders its form from.
    pub async fn list_for_display(&self, article_id: &ArticleId) -> anyhow::Result<Thread> {
        let settings = self.db.load_settings().await?;
        let comments = self.db.list_published(article_id).await?;
        Ok(Thread { comments, settings })
    }

    pub async fn admin_list(&self) -> anyhow::Result<Thread> {
        let settings = self.db.load_settings().await?;
        let comments = self.db.list_all_comments().await?;
        Ok(Thread { comments, settings })
    }

    pub async fn approve(&self, id: CommentId) -> anyhow::Result<()> {
        if self.db.approve_comment(id).await? {
            info!("Approved comment {}", id);
        } else {
            info!("Approve: no comment with id {}", id);
        }
        Ok(())
    }

    pub async fn delete(&self, id: CommentId) -> anyhow::Result<()> {
        if self.db.delete_comment(id).await? {
            info!("Deleted comment {}", id);
        } else {
            info!("Delete: no comment with id {}", id);
        }
        Ok(())
    }

    /// Takes raw checkbox values: `Some("on")` when ticked, otherwise off.
    pub async fn update_settings(
        &self,
        require_moderation: Option<&str>,
        require_sign_in: Option<&str>,
    ) -> anyhow::Result<Settings> {
        let new = Settings {
            require_moderation: settings::checkbox(require_moderation),
            require_sign_in: settings::checkbox(require_sign_in),
        };
        self.db.save_settings(&new).await?;
        info!(
            "Settings updated: require-moderation={} require-sign-in={}",
            new.require_moderation, new.require_sign_in
        );
        Ok(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn db() -> Db {
        Db::new("sqlite::memory:").await.unwrap()
    }

    fn submission(article: &str, author: &str, body: &str) -> Submission {
        Submission {
            article_id: ArticleId::new(article).unwrap(),
            author: author.to_string(),
            body: body.to_string(),
        }
    }

    fn a1() -> ArticleId {
        ArticleId::new("a1").unwrap()
    }

    #[tokio::test]
    async fn moderated_comment_waits_for_approval() {
        let db = db().await;
        let m = Moderation::new(&db);
        m.update_settings(Some("on"), None).await.unwrap();

        let id = m.submit(submission("a1", "bob", "hello"), None).await.unwrap();
        assert!(m.list_for_display(&a1()).await.unwrap().comments.is_empty());

        let all = m.admin_list().await.unwrap().comments;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert!(all[0].needs_moderation);

        m.approve(id).await.unwrap();
        let shown = m.list_for_display(&a1()).await.unwrap().comments;
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].author, "bob");
        assert_eq!(shown[0].body, "hello");
    }

    #[tokio::test]
    async fn unmoderated_comment_is_visible_immediately() {
        let db = db().await;
        let m = Moderation::new(&db);
        m.update_settings(None, None).await.unwrap();

        m.submit(submission("a1", "ann", "hi"), None).await.unwrap();
        let shown = m.list_for_display(&a1()).await.unwrap().comments;
        assert_eq!(shown.len(), 1);
        assert!(!shown[0].needs_moderation);
    }

    #[tokio::test]
    async fn moderation_defaults_to_on() {
        let db = db().await;
        let m = Moderation::new(&db);
        m.submit(submission("a1", "ann", "hi"), None).await.unwrap();
        assert!(m.list_for_display(&a1()).await.unwrap().comments.is_empty());
    }

    #[tokio::test]
    async fn forced_flag_beats_setting() {
        let db = db().await;
        let m = Moderation::new(&db);

        m.submit(submission("a1", "ann", "skip the queue"), Some(false)).await.unwrap();
        assert_eq!(m.list_for_display(&a1()).await.unwrap().comments.len(), 1);

        m.update_settings(None, None).await.unwrap();
        m.submit(submission("a1", "bob", "queue me"), Some(true)).await.unwrap();
        assert_eq!(m.list_for_display(&a1()).await.unwrap().comments.len(), 1);
    }

    #[tokio::test]
    async fn settings_change_is_not_retroactive() {
        let db = db().await;
        let m = Moderation::new(&db);
        m.update_settings(Some("on"), None).await.unwrap();
        m.submit(submission("a1", "ann", "pending"), None).await.unwrap();

        m.update_settings(None, None).await.unwrap();
        assert!(m.list_for_display(&a1()).await.unwrap().comments.is_empty());
        assert!(m.admin_list().await.unwrap().comments[0].needs_moderation);
    }

    #[tokio::test]
    async fn approve_and_delete_missing_ids_leave_others_alone() {
        let db = db().await;
        let m = Moderation::new(&db);
        let keep = m.submit(submission("a1", "ann", "pending"), None).await.unwrap();

        m.approve(keep + 1).await.unwrap();
        m.delete(keep + 1).await.unwrap();

        let all = m.admin_list().await.unwrap().comments;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, keep);
        assert!(all[0].needs_moderation);
    }

    #[tokio::test]
    async fn deleted_comment_is_gone_for_good() {
        let db = db().await;
        let m = Moderation::new(&db);
        let id = m.submit(submission("a1", "ann", "bye"), Some(false)).await.unwrap();

        m.delete(id).await.unwrap();
        m.approve(id).await.unwrap();
        assert!(m.admin_list().await.unwrap().comments.is_empty());
        assert!(m.list_for_display(&a1()).await.unwrap().comments.is_empty());
    }

    #[tokio::test]
    async fn checkbox_settings_are_normalised() {
        let db = db().await;
        let m = Moderation::new(&db);
        let s = m.update_settings(Some("on"), None).await.unwrap();
        assert!(s.require_moderation);
        assert!(!s.require_sign_in);

        assert_eq!(db.get_setting(settings::REQUIRE_MODERATION).await.unwrap(), "true");
        assert_eq!(db.get_setting(settings::REQUIRE_SIGN_IN).await.unwrap(), "false");

        let thread = m.list_for_display(&a1()).await.unwrap();
        assert!(thread.settings.require_moderation);
        assert!(!thread.settings.require_sign_in);
    }
}
