//! Database entity models for bulletin.
//!
//! This module contains the Sea-ORM entity definitions for every table the
//! service touches: the session table backing [`crate::SeaOrmStore`], the
//! credential tables consulted by the access gate, and the posting tables
//! (posts, feeds, broadcasts) served by the route handlers.

/// Session rows persisted by [`crate::SeaOrmStore`].
pub mod session;

/// People known to the service.
pub mod user;

/// Login credentials and role attached to a [`user`].
pub mod user_detail;

/// Posts and threads. A thread is a post without a parent.
pub mod post;

/// Named delivery channels for broadcasts.
pub mod feed;

/// Messages pushed out to one or more feeds.
pub mod broadcast;

/// Join table between [`broadcast`] and [`feed`].
pub mod broadcast_feed;
