use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use serde::Deserialize;
use tracing::info;

use crate::auth::policy::{PROTECTED_PREFIX, safe_callback};
use crate::auth::{AuthError, Session, SessionKeys, authenticate};
use crate::error::AppError;
use crate::ui::LoginView;
use crate::validation::LoginForm;

use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub(super) struct LoginQuery {
    #[serde(rename = "callbackUrl")]
    callback_url: Option<String>,
}

pub(super) async fn landing(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(state.renderer.landing()?))
}

pub(super) async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Result<Html<String>, AppError> {
    let callback = query.callback_url.as_deref().unwrap_or(PROTECTED_PREFIX);
    let view = LoginView::new("", callback, None);
    Ok(Html(state.renderer.login(&view)?))
}

pub(super) async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match authenticate(state.store.as_ref(), &form).await {
        Ok(user) => {
            let cookie = state.sessions.set_cookie(&state.sessions.issue(&user.email));
            let target = safe_callback(form.callback_url.as_deref());
            Ok(([(header::SET_COOKIE, cookie)], Redirect::to(target)).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            let callback = form.callback_url.as_deref().unwrap_or(PROTECTED_PREFIX);
            let view = LoginView::new(
                &form.email,
                callback,
                Some(AuthError::InvalidCredentials.to_string()),
            );
            let body = state.renderer.login(&view)?;
            Ok((StatusCode::UNAUTHORIZED, Html(body)).into_response())
        }
        Err(AuthError::Store(error)) => Err(error.into()),
    }
}

pub(super) async fn logout(Extension(session): Extension<Session>) -> Response {
    info!(email = %session.email, "user signed out");
    (
        [(header::SET_COOKIE, SessionKeys::clear_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
