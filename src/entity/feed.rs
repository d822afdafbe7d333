use sea_orm::entity::prelude::*;

/// Name of the feed whose broadcasts appear in the notification panel.
pub const NOTIFICATION_FEED: &str = "notification";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "feeds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::broadcast_feed::Entity")]
    BroadcastFeeds,
}

impl Related<super::broadcast_feed::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BroadcastFeeds.def()
    }
}

impl Related<super::broadcast::Entity> for Entity {
    fn to() -> RelationDef {
        super::broadcast_feed::Relation::Broadcast.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::broadcast_feed::Relation::Feed.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
