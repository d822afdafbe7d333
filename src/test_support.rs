//! Fixtures shared by the unit tests.

use std::sync::Arc;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use tower_sessions::{MemoryStore, Session};

use crate::credentials::{NewAccount, SeaOrmCredentialStore};
use crate::entity::{broadcast, broadcast_feed, feed, post, session, user, user_detail};
use crate::{GateSession, Principal};

/// Single-connection in-memory SQLite with every table created from the
/// entity definitions.
pub(crate) async fn memory_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();

    let schema = Schema::new(db.get_database_backend());
    let backend = db.get_database_backend();
    let statements = [
        schema.create_table_from_entity(session::Entity),
        schema.create_table_from_entity(user::Entity),
        schema.create_table_from_entity(user_detail::Entity),
        schema.create_table_from_entity(post::Entity),
        schema.create_table_from_entity(feed::Entity),
        schema.create_table_from_entity(broadcast::Entity),
        schema.create_table_from_entity(broadcast_feed::Entity),
    ];
    for stmt in statements {
        db.execute(backend.build(&stmt)).await.unwrap();
    }
    db
}

pub(crate) fn memory_session() -> GateSession {
    GateSession::new(Session::new(None, Arc::new(MemoryStore::default()), None))
}

pub(crate) async fn register(
    store: &SeaOrmCredentialStore,
    login: &str,
    password: &str,
) -> Principal {
    store
        .register(NewAccount {
            firstname: "Test".to_string(),
            surname: login.to_string(),
            email: format!("{login}@example.test"),
            login: login.to_string(),
            password: password.to_string(),
            role: None,
        })
        .await
        .unwrap()
}
