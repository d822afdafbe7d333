//! One-shot messages shown to browser users.
//!
//! Messages pushed through [`crate::GateSession::push_flash`] survive exactly
//! one redirect: the next request takes them out of the session and renders
//! them. Messages that only concern the current response go straight into
//! [`crate::RequestContext::notices`] instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Notice,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Notice => "notice",
            FlashLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Notice,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            text: text.into(),
        }
    }
}
