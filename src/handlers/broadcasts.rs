//! Administrator broadcasts. Anything sent on the `notification` feed shows
//! up in every logged-in user's side panel.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use tower_sessions::Session;

use super::{created, principal, respond, Input};
use crate::context::RequestContext;
use crate::entity::feed::NOTIFICATION_FEED;
use crate::error::AppError;
use crate::flash::FlashMessage;
use crate::format::ResponseFormat;
use crate::gate::Found;
use crate::session_state::GateSession;
use crate::state::AppState;
use crate::views;

pub const BROADCAST_SENT: &str = "Broadcast was successfully sent.";

#[derive(Debug, Deserialize)]
pub struct NewBroadcast {
    pub content: String,
    /// Comma separated feed names. Empty means the notification feed.
    #[serde(default)]
    pub feeds: String,
}

impl NewBroadcast {
    fn feed_names(&self) -> Vec<String> {
        let names: Vec<String> = self
            .feeds
            .split(',')
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            vec![NOTIFICATION_FEED.to_string()]
        } else {
            names
        }
    }
}

pub async fn index(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let broadcasts = state.broadcasts.list().await?;
    respond(&ctx, &broadcasts, || {
        let title = state.catalog().translate(&ctx.locale, "broadcasts.title");
        views::page(
            &ctx,
            state.catalog(),
            &title,
            &views::broadcast_list(&broadcasts),
        )
    })
}

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    session: Session,
    Input(form): Input<NewBroadcast>,
) -> Result<Response, AppError> {
    let content = form.content.trim();
    if content.is_empty() {
        return Err(AppError::InvalidInput(
            "content must not be empty".to_string(),
        ));
    }

    let sent = state
        .broadcasts
        .create(principal(&ctx)?, content, &form.feed_names())
        .await?;

    match ctx.format {
        ResponseFormat::Html => {
            GateSession::new(session)
                .push_flash(FlashMessage::notice(BROADCAST_SENT))
                .await?;
            Ok(Found("/broadcasts".to_string()).into_response())
        }
        ResponseFormat::Json => Ok(created(&sent)),
        _ => Err(AppError::NotAcceptable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_names_default_to_notification() {
        let form = NewBroadcast {
            content: "hi".into(),
            feeds: " , ".into(),
        };
        assert_eq!(form.feed_names(), vec![NOTIFICATION_FEED]);

        let form = NewBroadcast {
            content: "hi".into(),
            feeds: "email, notification".into(),
        };
        assert_eq!(form.feed_names(), vec!["email", "notification"]);
    }
}
