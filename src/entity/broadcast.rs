use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A message sent by a user to one or more [`super::feed`]s.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "broadcasts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::broadcast_feed::Entity")]
    BroadcastFeeds,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::broadcast_feed::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BroadcastFeeds.def()
    }
}

impl Related<super::feed::Entity> for Entity {
    fn to() -> RelationDef {
        super::broadcast_feed::Relation::Feed.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::broadcast_feed::Relation::Broadcast.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
