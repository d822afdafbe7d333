use axum::{extract::State, response::Response, Extension};
use serde::Serialize;

use crate::context::RequestContext;
use crate::entity::broadcast;
use crate::error::AppError;
use crate::posts::PostView;
use crate::state::AppState;
use crate::views;

const RECENT_THREADS: u64 = 10;

#[derive(Serialize)]
struct Home<'a> {
    user: &'a str,
    threads: Vec<PostView>,
    notifications: &'a [broadcast::Model],
}

pub async fn index(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let principal = super::principal(&ctx)?;
    let home = Home {
        user: &principal.display_name,
        threads: state.posts.threads(RECENT_THREADS).await?,
        notifications: &ctx.notifications,
    };

    super::respond(&ctx, &home, || {
        let title = state.catalog().translate(&ctx.locale, "home.title");
        views::page(
            &ctx,
            state.catalog(),
            &title,
            &views::post_list(&home.threads),
        )
    })
}
