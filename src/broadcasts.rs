use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;

use crate::entity::{broadcast, broadcast_feed, feed};
use crate::principal::Principal;

/// A broadcast together with the feeds it went out on.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastView {
    #[serde(flatten)]
    pub broadcast: broadcast::Model,
    pub feeds: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BroadcastRepository {
    conn: DatabaseConnection,
}

impl BroadcastRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        author: &Principal,
        content: &str,
        feeds: &[String],
    ) -> Result<BroadcastView, DbErr> {
        self.create_at(author, content, feeds, chrono::Utc::now().fixed_offset())
            .await
    }

    /// Stores a broadcast and links it to each named feed, creating feeds
    /// that do not exist yet. Duplicate and blank names are ignored.
    pub async fn create_at(
        &self,
        author: &Principal,
        content: &str,
        feeds: &[String],
        at: DateTimeWithTimeZone,
    ) -> Result<BroadcastView, DbErr> {
        let mut names: Vec<String> = feeds
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        names.sort();
        names.dedup();

        let txn = self.conn.begin().await?;
        let created = broadcast::ActiveModel {
            user_id: Set(author.user_id),
            content: Set(content.to_string()),
            created_at: Set(at),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for name in &names {
            let existing = feed::Entity::find()
                .filter(feed::Column::Name.eq(name.as_str()))
                .one(&txn)
                .await?;
            let feed = if let Some(existing) = existing {
                existing
            } else {
                feed::ActiveModel {
                    name: Set(name.clone()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            };

            broadcast_feed::ActiveModel {
                broadcast_id: Set(created.id),
                feed_id: Set(feed.id),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;

        tracing::info!(broadcast_id = created.id, feeds = ?names, "broadcast sent");
        Ok(BroadcastView {
            broadcast: created,
            feeds: names,
        })
    }

    /// Every broadcast, newest first.
    pub async fn list(&self) -> Result<Vec<BroadcastView>, DbErr> {
        let rows = broadcast::Entity::find()
            .find_with_related(feed::Entity)
            .order_by_desc(broadcast::Column::CreatedAt)
            .order_by_desc(broadcast::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(broadcast, feeds)| BroadcastView {
                broadcast,
                feeds: feeds.into_iter().map(|f| f.name).collect(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::SeaOrmCredentialStore;
    use crate::test_support::{memory_db, register};

    #[tokio::test]
    async fn feeds_are_created_once_and_linked() {
        let db = memory_db().await;
        let admin = register(&SeaOrmCredentialStore::new(db.clone()), "admin", "pw").await;
        let repo = BroadcastRepository::new(db.clone());

        let first = repo
            .create(
                &admin,
                "Exam results are out",
                &["notification".into(), " email ".into(), "email".into()],
            )
            .await
            .unwrap();
        assert_eq!(first.feeds, vec!["email", "notification"]);

        repo.create(&admin, "Party on Friday", &["notification".into()])
            .await
            .unwrap();

        assert_eq!(feed::Entity::find().all(&db).await.unwrap().len(), 2);

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].broadcast.content, "Party on Friday");
        assert_eq!(listed[1].feeds.len(), 2);
    }
}
