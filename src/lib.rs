//! # Bulletin
//!
//! A small community bulletin board built on [`axum`](https://crates.io/crates/axum),
//! [`tower-sessions`](https://crates.io/crates/tower-sessions) and
//! [Sea-ORM](https://crates.io/crates/sea-orm).
//!
//! The heart of the crate is the [`AccessGate`]: the request-level policy
//! that decides who a request acts as, whether it may proceed, and where a
//! refused browser is sent. Everything else (posts, threads, broadcasts and
//! the notification panel) sits behind it.
//!
//! ## Features
//!
//! - Session login with a bounce-back to the page that required it
//! - HTTP Basic authentication for JSON clients, answered with a `401`
//!   challenge when missing
//! - Administrator-only pages for user listing and broadcasts
//! - Per-session locale selection with a logged fallback to the default
//! - Sessions persisted through Sea-ORM as MessagePack blobs
//!
//! ## Quick Start
//!
//! ```no_run
//! use bulletin::{router, AppState, Config, SeaOrmStore};
//! use sea_orm::Database;
//! use time::Duration;
//! use tower_sessions::{Expiry, SessionManagerLayer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let conn = Database::connect(&config.database_url).await?;
//!
//! let sessions = SessionManagerLayer::new(SeaOrmStore::new(conn.clone()))
//!     .with_expiry(Expiry::OnInactivity(Duration::days(config.session_idle_days)));
//!
//! let state = AppState::new(conn, config.gate_settings(), config.locale_settings());
//! let app = router(state).layer(sessions);
//!
//! let listener = tokio::net::TcpListener::bind(config.addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Response formats
//!
//! Each request is classified as HTML, JSON, XML or other from its path
//! extension and `Accept` header (see [`ResponseFormat`]). Only HTML
//! requests are treated as browsers; handlers answer HTML and JSON and
//! refuse the rest with `406`.
//!
//! ## Using the gate in handlers
//!
//! The middleware stores a [`RequestContext`] in the request extensions:
//!
//! ```no_run
//! use axum::Extension;
//! use bulletin::RequestContext;
//!
//! async fn whoami(Extension(ctx): Extension<RequestContext>) -> String {
//!     match &ctx.principal {
//!         Some(principal) => principal.login.clone(),
//!         None => "anonymous".to_string(),
//!     }
//! }
//! ```

pub mod basic_auth;
pub mod broadcasts;
pub mod config;
pub mod context;
pub mod credentials;
pub mod entity;
pub mod error;
pub mod flash;
pub mod format;
pub mod gate;
pub mod handlers;
pub mod locale;
pub mod middleware;
#[cfg(feature = "migration")]
pub mod migration;
pub mod notifications;
pub mod posts;
pub mod principal;
pub mod routes;
mod sea_orm_store;
pub mod session_state;
pub mod state;
pub mod views;

#[cfg(test)]
mod test_support;

/// The Sea-ORM session store used by the session layer.
pub use sea_orm_store::SeaOrmStore;

pub use config::Config;
pub use context::RequestContext;
pub use credentials::{CredentialStore, SeaOrmCredentialStore};
pub use error::{AppError, GateError};
pub use format::ResponseFormat;
pub use gate::{AccessGate, Found, GateSettings, Rejection};
pub use locale::{LocaleSettings, TranslationCatalog};
pub use principal::{Principal, PrincipalId, Role};
pub use routes::router;
pub use session_state::GateSession;
pub use state::AppState;

// Re-exported from tower-sessions so callers need not depend on it directly

/// Session storage error types and results.
pub use tower_sessions::session_store;

/// Periodic removal of expired sessions, implemented by [`SeaOrmStore`].
pub use tower_sessions::ExpiredDeletion;

pub use tower_sessions::Session;
pub use tower_sessions::SessionStore;
