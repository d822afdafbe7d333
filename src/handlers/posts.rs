//! Threads and replies.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::{created, principal, respond, Input};
use crate::context::RequestContext;
use crate::error::AppError;
use crate::flash::FlashMessage;
use crate::format::ResponseFormat;
use crate::gate::Found;
use crate::posts::{NewPost, PostView};
use crate::session_state::GateSession;
use crate::state::AppState;
use crate::views;

const LISTED_THREADS: u64 = 50;
const SEARCH_RESULTS: u64 = 50;

pub const POST_CREATED: &str = "Post was successfully created.";

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
struct SearchResults<'a> {
    query: &'a str,
    results: Vec<PostView>,
}

pub async fn index(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let threads = state.posts.threads(LISTED_THREADS).await?;
    respond(&ctx, &threads, || {
        let title = state.catalog().translate(&ctx.locale, "posts.title");
        let body = format!(
            "{}<p><a href=\"/posts/new\">+</a></p>{}",
            views::search_form(""),
            views::post_list(&threads)
        );
        views::page(&ctx, state.catalog(), &title, &body)
    })
}

pub async fn new(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    // Nothing to send a machine client
    respond(&ctx, &(), || {
        let title = state.catalog().translate(&ctx.locale, "posts.new");
        views::page(&ctx, state.catalog(), &title, views::new_post_form())
    })
}

pub async fn search(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let results = SearchResults {
        query: &params.q,
        results: state.posts.search(&params.q, SEARCH_RESULTS).await?,
    };
    respond(&ctx, &results, || {
        let title = state.catalog().translate(&ctx.locale, "posts.search");
        let body = format!(
            "{}{}",
            views::search_form(&params.q),
            views::post_list(&results.results)
        );
        views::page(&ctx, state.catalog(), &title, &body)
    })
}

pub async fn show(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let thread = state.posts.find(id).await?.ok_or(AppError::NotFound)?;
    respond(&ctx, &thread, || {
        views::page(
            &ctx,
            state.catalog(),
            &thread.post.title,
            &views::thread(&thread),
        )
    })
}

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    session: Session,
    Input(post): Input<NewPost>,
) -> Result<Response, AppError> {
    let post = post
        .validated()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    let created = state.posts.create_thread(principal(&ctx)?, post).await?;
    finish(&ctx, GateSession::new(session), created.id, &created).await
}

pub async fn reply(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    session: Session,
    Path(parent_id): Path<i32>,
    Input(post): Input<NewPost>,
) -> Result<Response, AppError> {
    let post = post
        .validated()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    let created = state
        .posts
        .reply(principal(&ctx)?, parent_id, post)
        .await?
        .ok_or(AppError::NotFound)?;
    let thread_id = created.thread_id.unwrap_or(created.id);
    finish(&ctx, GateSession::new(session), thread_id, &created).await
}

async fn finish(
    ctx: &RequestContext,
    session: GateSession,
    show_id: i32,
    created_post: &PostView,
) -> Result<Response, AppError> {
    match ctx.format {
        ResponseFormat::Html => {
            session
                .push_flash(FlashMessage::notice(POST_CREATED))
                .await?;
            Ok(Found(format!("/posts/{show_id}")).into_response())
        }
        ResponseFormat::Json => Ok(created(created_post)),
        _ => Err(AppError::NotAcceptable),
    }
}
