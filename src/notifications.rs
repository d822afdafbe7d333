//! Read-only query behind the notification side panel.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};

use crate::entity::{broadcast, broadcast_feed, feed};

/// How many notifications the side panel shows.
pub const NOTIFICATION_LIMIT: u64 = 20;

#[async_trait]
pub trait NotificationFeed: Send + Sync + 'static {
    /// Newest broadcasts on the notification feed, at most `limit`.
    async fn latest(&self, limit: u64) -> Result<Vec<broadcast::Model>, DbErr>;
}

#[derive(Debug, Clone)]
pub struct SeaOrmNotificationFeed {
    conn: DatabaseConnection,
}

impl SeaOrmNotificationFeed {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl NotificationFeed for SeaOrmNotificationFeed {
    async fn latest(&self, limit: u64) -> Result<Vec<broadcast::Model>, DbErr> {
        broadcast::Entity::find()
            .join(
                JoinType::InnerJoin,
                broadcast::Relation::BroadcastFeeds.def(),
            )
            .join(JoinType::InnerJoin, broadcast_feed::Relation::Feed.def())
            .filter(feed::Column::Name.eq(feed::NOTIFICATION_FEED))
            .order_by_desc(broadcast::Column::CreatedAt)
            .order_by_desc(broadcast::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
    }
}
