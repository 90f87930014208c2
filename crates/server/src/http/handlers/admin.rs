use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Redirect,
    Form, Json,
};
use domain::{Comment, CommentId, Settings};
use serde::{Deserialize, Serialize};

use super::{approve_path, delete_path, SETTINGS_PATH};
use crate::error::{AppError, ResultExt};
use crate::moderation::Moderation;
use crate::state::AppState;

#[derive(Serialize, Deserialize)]
pub struct AdminComment {
    pub id: CommentId,
    pub article_id: String,
    pub author: String,
    pub body: String,
    pub body_html: String,
    pub needs_moderation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approve_csrf: Option<String>,
    pub delete_csrf: String,
}

#[derive(Serialize, Deserialize)]
pub struct AdminPage {
    pub settings: Settings,
    pub settings_csrf: String,
    pub comments: Vec<AdminComment>,
}

pub async fn admin_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminPage>, AppError> {
    let thread = Moderation::new(&state.db)
        .admin_list()
        .await
        .or_internal("loading comments for admin page")?;
    let identity = state.authorizer.identity(&headers);

    let comments = thread
        .comments
        .into_iter()
        .map(|c: Comment| AdminComment {
            approve_csrf: c
                .needs_moderation
                .then(|| state.csrf.generate(&identity, &approve_path(c.id))),
            delete_csrf: state.csrf.generate(&identity, &delete_path(c.id)),
            body_html: state.renderer.render(&c.body),
            id: c.id,
            article_id: c.article_id.to_string(),
            author: c.author,
            body: c.body,
            needs_moderation: c.needs_moderation,
        })
        .collect();

    Ok(Json(AdminPage {
        settings: thread.settings,
        settings_csrf: state.csrf.generate(&identity, SETTINGS_PATH),
        comments,
    }))
}

/// Checkbox fields: present as `on` when ticked, absent otherwise.
#[derive(Deserialize)]
pub struct SettingsForm {
    #[serde(rename = "require-moderation")]
    pub require_moderation: Option<String>,
    #[serde(rename = "require-sign-in")]
    pub require_sign_in: Option<String>,
}

pub async fn update_settings(
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect, AppError> {
    Moderation::new(&state.db)
        .update_settings(
            form.require_moderation.as_deref(),
            form.require_sign_in.as_deref(),
        )
        .await
        .or_internal("updating settings")?;
    Ok(Redirect::to("/"))
}

pub async fn approve_comment(
    State(state): State<AppState>,
    Path(id): Path<CommentId>,
) -> Result<Redirect, AppError> {
    Moderation::new(&state.db)
        .approve(id)
        .await
        .or_internal("approving comment")?;
    Ok(Redirect::to("/"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<CommentId>,
) -> Result<Redirect, AppError> {
    Moderation::new(&state.db)
        .delete(id)
        .await
        .or_internal("deleting comment")?;
    Ok(Redirect::to("/"))
}
