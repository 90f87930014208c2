use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue},
    response::Redirect,
    Form, Json,
};
use domain::{ArticleId, Comment, CommentId};
use serde::{Deserialize, Serialize};

use super::NEW_COMMENT_PATH;
use crate::error::{AppError, ResultExt};
use crate::moderation::{Moderation, Submission};
use crate::render::BodyRenderer;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CommentsQuery {
    #[serde(rename = "articleId")]
    pub article_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct CommentView {
    pub id: CommentId,
    pub author: String,
    pub body: String,
    pub body_html: String,
}

impl CommentView {
    fn new(c: Comment, renderer: &dyn BodyRenderer) -> Self {
        let body_html = renderer.render(&c.body);
        Self {
            id: c.id,
            author: c.author,
            body: c.body,
            body_html,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct CommentsPage {
    pub article_id: String,
    pub comments: Vec<CommentView>,
    /// New comments will be held for review.
    pub moderated: bool,
    /// The form should send readers to sign in before posting.
    pub needs_login: bool,
    /// Token for posting to `/new-comment`.
    pub csrf: String,
}

pub async fn show_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CommentsQuery>,
) -> Result<Json<CommentsPage>, AppError> {
    let article_id = ArticleId::new(query.article_id.unwrap_or_default())
        .map_err(|_| AppError::bad_request("articleId not set."))?;

    let thread = Moderation::new(&state.db)
        .list_for_display(&article_id)
        .await
        .or_internal(&format!("getting comments for article: {}", article_id))?;

    let identity = state.authorizer.identity(&headers);

    Ok(Json(CommentsPage {
        article_id: article_id.to_string(),
        comments: thread
            .comments
            .into_iter()
            .map(|c| CommentView::new(c, state.renderer.as_ref()))
            .collect(),
        moderated: thread.settings.require_moderation,
        needs_login: thread.settings.require_sign_in,
        csrf: state.csrf.generate(&identity, NEW_COMMENT_PATH),
    }))
}

#[derive(Deserialize)]
pub struct NewCommentForm {
    #[serde(default)]
    pub article_id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub redirect: String,
}

pub async fn new_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<NewCommentForm>,
) -> Result<Redirect, AppError> {
    let article_id =
        ArticleId::new(form.article_id).map_err(|_| AppError::bad_request("article_id not set."))?;
    if form.redirect.is_empty() {
        return Err(AppError::bad_request("redirect not set."));
    }
    if HeaderValue::from_str(&form.redirect).is_err() {
        return Err(AppError::bad_request("invalid redirect."));
    }
    if !state.redirects.permits(&form.redirect) {
        tracing::warn!("Refusing redirect to {:?}", form.redirect);
        return Err(AppError::RedirectRejected);
    }

    let forced = state.authorizer.capabilities(&headers).forced_moderation();
    Moderation::new(&state.db)
        .submit(
            Submission {
                article_id,
                author: form.author,
                body: form.body,
            },
            forced,
        )
        .await
        .or_internal("saving comment to the database")?;

    Ok(Redirect::to(&form.redirect))
}

pub async fn comment_sign_in() -> &'static str {
    "Sign in page not yet implemented"
}
