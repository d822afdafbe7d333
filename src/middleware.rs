//! Axum middleware wiring the [`AccessGate`](crate::AccessGate) into the
//! request path.
//!
//! Order, outermost first:
//!
//! 1. [`strip_format_extension`] before routing.
//! 2. [`load_context`] on every route: locale, principal, carried-over
//!    flash, response format.
//! 3. [`login_required`] on every route except the login endpoints.
//! 4. [`admin_required`] on administrative routes.
//! 5. [`store_location`] on bounce-back routes.

use axum::{
    extract::{Query, Request, State},
    http::Uri,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::basic_auth::BasicCredentials;
use crate::context::RequestContext;
use crate::error::GateError;
use crate::format::ResponseFormat;
use crate::gate::Rejection;
use crate::notifications::NOTIFICATION_LIMIT;
use crate::session_state::GateSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct LocaleParam {
    locale: Option<String>,
}

/// Path plus query string, the way it is stored for bounce-back.
pub fn full_path(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Path and query exactly as the client sent them, kept aside when
/// [`strip_format_extension`] rewrites the URI for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedPath(pub String);

fn requested_path(req: &Request) -> String {
    req.extensions()
        .get::<RequestedPath>()
        .map(|RequestedPath(path)| path.clone())
        .unwrap_or_else(|| full_path(req.uri()))
}

fn gate_session(req: &Request) -> Result<GateSession, GateError> {
    req.extensions()
        .get::<Session>()
        .cloned()
        .map(GateSession::new)
        .ok_or(GateError::SessionLayerMissing)
}

fn context(req: &Request) -> Result<&RequestContext, GateError> {
    req.extensions()
        .get::<RequestContext>()
        .ok_or(GateError::ContextMissing)
}

/// Takes a `.json`, `.xml` or `.html` suffix off the path before routing,
/// keeping the format it named in the request extensions.
pub async fn strip_format_extension(mut req: Request, next: Next) -> Response {
    if let Some((format, uri)) = ResponseFormat::split_extension(req.uri()) {
        let requested = RequestedPath(full_path(req.uri()));
        *req.uri_mut() = uri;
        req.extensions_mut().insert(format);
        req.extensions_mut().insert(requested);
    }
    next.run(req).await
}

pub async fn load_context(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Rejection> {
    let session = gate_session(&req)?;
    let format = req
        .extensions()
        .get::<ResponseFormat>()
        .copied()
        .unwrap_or_else(|| ResponseFormat::negotiate(req.uri(), req.headers()));
    let path = requested_path(&req);
    let requested_locale = Query::<LocaleParam>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(param)| param.locale);

    let locale = state
        .gate
        .resolve_locale(&session, requested_locale.as_deref())
        .await?;
    let credentials = BasicCredentials::from_headers(req.headers());
    let principal = state
        .gate
        .resolve_principal(&session, credentials.as_ref())
        .await?;
    let flash = session.take_flash().await?;

    req.extensions_mut().insert(RequestContext {
        principal,
        format,
        locale: locale.locale,
        full_path: path,
        flash,
        notices: locale.notice.into_iter().collect(),
        notifications: Vec::new(),
    });

    Ok(next.run(req).await)
}

/// Stops anonymous requests, then fills the notification panel.
pub async fn login_required(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Rejection> {
    let session = gate_session(&req)?;
    let ctx = context(&req)?;
    let principal = ctx.principal.as_ref();
    state
        .gate
        .enforce_authenticated(principal, ctx.format, &session, &ctx.full_path)
        .await?;

    // The panel never decides the outcome of a request
    let notifications = match state.notifications.latest(NOTIFICATION_LIMIT).await {
        Ok(notifications) => notifications,
        Err(err) => {
            tracing::warn!(error = %err, "notifications unavailable");
            Vec::new()
        }
    };
    if let Some(ctx) = req.extensions_mut().get_mut::<RequestContext>() {
        ctx.notifications = notifications;
    }

    Ok(next.run(req).await)
}

pub async fn admin_required(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, Rejection> {
    let session = gate_session(&req)?;
    let ctx = context(&req)?;
    state
        .gate
        .enforce_admin(ctx.principal.as_ref(), ctx.format, &session)
        .await?;

    Ok(next.run(req).await)
}

/// Records the request path as the bounce-back target once the handler has
/// answered without an error status.
pub async fn store_location(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, Rejection> {
    let session = gate_session(&req)?;
    let path = requested_path(&req);

    let response = next.run(req).await;
    if !response.status().is_client_error() && !response.status().is_server_error() {
        state.gate.record_return_location(&session, &path).await?;
    }
    Ok(response)
}
