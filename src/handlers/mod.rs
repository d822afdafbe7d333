//! Route handlers. Each answers HTML or JSON depending on the negotiated
//! [`ResponseFormat`]; other formats get `406 Not Acceptable`.

pub mod broadcasts;
pub mod home;
pub mod posts;
pub mod sessions;
pub mod users;

use axum::{
    extract::{FromRequest, Request},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::context::RequestContext;
use crate::error::AppError;
use crate::format::ResponseFormat;
use crate::principal::Principal;

/// Request body read as JSON when `Content-Type` says so, as a urlencoded
/// form otherwise.
pub struct Input<T>(pub T);

impl<S, T> FromRequest<S> for Input<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(value)| Input(value))
                .map_err(IntoResponse::into_response)
        } else {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(value)| Input(value))
                .map_err(IntoResponse::into_response)
        }
    }
}

pub(crate) fn respond<T, F>(ctx: &RequestContext, data: &T, html: F) -> Result<Response, AppError>
where
    T: Serialize,
    F: FnOnce() -> Html<String>,
{
    match ctx.format {
        ResponseFormat::Html => Ok(html().into_response()),
        ResponseFormat::Json => Ok(Json(data).into_response()),
        ResponseFormat::Xml | ResponseFormat::Other => Err(AppError::NotAcceptable),
    }
}

pub(crate) fn created<T: Serialize>(data: &T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Handlers behind `login_required` always have a principal.
pub(crate) fn principal(ctx: &RequestContext) -> Result<&Principal, AppError> {
    ctx.principal
        .as_ref()
        .ok_or(AppError::Gate(crate::error::GateError::ContextMissing))
}
