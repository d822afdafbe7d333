use sea_orm::entity::prelude::*;

/// A person registered with the service.
///
/// Credentials live separately in [`super::user_detail`] so that profile
/// data can be listed without touching password hashes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub firstname: String,
    pub surname: String,
    pub email: String,
    pub phone: Option<String>,
    pub grad_year: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_detail::Entity")]
    UserDetail,
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
    #[sea_orm(has_many = "super::broadcast::Entity")]
    Broadcasts,
}

impl Related<super::user_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserDetail.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::broadcast::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Broadcasts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// `firstname surname`, as shown next to posts and in the header.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.surname)
    }
}
