//! Login and logout.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use tower_sessions::Session;

use super::Input;
use crate::context::RequestContext;
use crate::error::AppError;
use crate::flash::FlashMessage;
use crate::gate::{Found, Rejection};
use crate::session_state::GateSession;
use crate::state::AppState;
use crate::views;

pub const LOGGED_IN: &str = "Logged in successfully";
pub const LOGGED_OUT: &str = "You have been logged out";
pub const BAD_CREDENTIALS: &str = "Invalid login or password";

#[derive(Deserialize)]
pub struct LoginForm {
    pub login: String,
    pub password: String,
}

pub async fn new(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    let title = state.catalog().translate(&ctx.locale, "session.title");
    let form = views::login_form(state.catalog(), &ctx.locale);
    views::page(&ctx, state.catalog(), &title, &form).into_response()
}

/// Logs in and sends the browser back to where it was stopped, or to its
/// last bounce-back page.
pub async fn create(
    State(state): State<AppState>,
    Extension(mut ctx): Extension<RequestContext>,
    session: Session,
    Input(form): Input<LoginForm>,
) -> Result<Response, AppError> {
    let session = GateSession::new(session);
    let authenticated = state
        .gate
        .authenticate(&form.login, &form.password)
        .await?;

    let Some(principal) = authenticated else {
        tracing::info!(login = %form.login, "login failed");
        if !ctx.format.is_html() {
            return Ok(Rejection::Challenge {
                realm: state.gate.settings().realm.clone(),
            }
            .into_response());
        }
        ctx.notices.push(FlashMessage::error(BAD_CREDENTIALS));
        let title = state.catalog().translate(&ctx.locale, "session.title");
        let form = views::login_form(state.catalog(), &ctx.locale);
        let page = views::page(&ctx, state.catalog(), &title, &form);
        return Ok((StatusCode::UNAUTHORIZED, page).into_response());
    };

    session.cycle_id().await?;
    session.set_principal_id(Some(principal.id)).await?;
    tracing::info!(login = %principal.login, "logged in");

    if !ctx.format.is_html() {
        return Ok(axum::Json(principal).into_response());
    }

    session.push_flash(FlashMessage::notice(LOGGED_IN)).await?;
    if let Some(original) = session.take_original_request_path().await? {
        return Ok(Found(original).into_response());
    }
    Ok(state
        .gate
        .redirect_back_or_default(&session, &state.gate.settings().root_path)
        .await?
        .into_response())
}

pub async fn destroy(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    session: Session,
) -> Result<Response, AppError> {
    let session = GateSession::new(session);
    session.set_principal_id(None).await?;
    if let Some(principal) = &ctx.principal {
        tracing::info!(login = %principal.login, "logged out");
    }

    if !ctx.format.is_html() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    session.push_flash(FlashMessage::notice(LOGGED_OUT)).await?;
    let login_path = state.gate.settings().login_path.clone();
    Ok(Found(login_path).into_response())
}
