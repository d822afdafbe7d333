use axum::{
    extract::{Path, State},
    response::Response,
    Extension,
};

use super::respond;
use crate::context::RequestContext;
use crate::credentials::CredentialStore;
use crate::error::AppError;
use crate::principal::PrincipalId;
use crate::state::AppState;
use crate::views;

pub async fn index(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let users = state.accounts.list().await?;
    respond(&ctx, &users, || {
        let title = state.catalog().translate(&ctx.locale, "users.title");
        views::page(&ctx, state.catalog(), &title, &views::user_list(&users))
    })
}

pub async fn show(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let user = state
        .accounts
        .find_by_id(PrincipalId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;
    respond(&ctx, &user, || {
        views::page(
            &ctx,
            state.catalog(),
            &user.display_name,
            &views::user_list(std::slice::from_ref(&user)),
        )
    })
}
