use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::broadcasts::BroadcastRepository;
use crate::credentials::SeaOrmCredentialStore;
use crate::gate::{AccessGate, GateSettings};
use crate::locale::{LocaleSettings, TranslationCatalog};
use crate::notifications::{NotificationFeed, SeaOrmNotificationFeed};
use crate::posts::PostRepository;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AccessGate>,
    pub accounts: SeaOrmCredentialStore,
    pub posts: PostRepository,
    pub broadcasts: BroadcastRepository,
    pub notifications: Arc<dyn NotificationFeed>,
}

impl AppState {
    pub fn new(conn: DatabaseConnection, gate: GateSettings, locales: LocaleSettings) -> Self {
        let accounts = SeaOrmCredentialStore::new(conn.clone());
        let gate = AccessGate::new(
            Arc::new(accounts.clone()),
            TranslationCatalog::new(locales),
            gate,
        );

        Self {
            gate: Arc::new(gate),
            accounts,
            posts: PostRepository::new(conn.clone()),
            broadcasts: BroadcastRepository::new(conn.clone()),
            notifications: Arc::new(SeaOrmNotificationFeed::new(conn)),
        }
    }

    pub fn catalog(&self) -> &TranslationCatalog {
        self.gate.catalog()
    }
}
