use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Firstname).string().not_null())
                    .col(ColumnDef::new(Users::Surname).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string())
                    .col(ColumnDef::new(Users::GradYear).integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserDetails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserDetails::Login)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(UserDetails::PasswordHash)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserDetails::Role)
                            .string()
                            .not_null()
                            .default("member"),
                    )
                    .col(ColumnDef::new(UserDetails::UserId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_details_user")
                            .from(UserDetails::Table, UserDetails::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Posts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Posts::UserId).integer().not_null())
                    .col(ColumnDef::new(Posts::ThreadId).integer())
                    .col(ColumnDef::new(Posts::Title).string().not_null())
                    .col(ColumnDef::new(Posts::Body).text().not_null())
                    .col(
                        ColumnDef::new(Posts::Anonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_user")
                            .from(Posts::Table, Posts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_thread")
                            .from(Posts::Table, Posts::ThreadId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_thread_id")
                    .table(Posts::Table)
                    .col(Posts::ThreadId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Feeds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Feeds::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Feeds::Name).string().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Broadcasts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Broadcasts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Broadcasts::UserId).integer().not_null())
                    .col(ColumnDef::new(Broadcasts::Content).text().not_null())
                    .col(
                        ColumnDef::new(Broadcasts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_broadcasts_user")
                            .from(Broadcasts::Table, Broadcasts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BroadcastFeeds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BroadcastFeeds::BroadcastId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BroadcastFeeds::FeedId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(BroadcastFeeds::BroadcastId)
                            .col(BroadcastFeeds::FeedId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_broadcast_feeds_broadcast")
                            .from(BroadcastFeeds::Table, BroadcastFeeds::BroadcastId)
                            .to(Broadcasts::Table, Broadcasts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_broadcast_feeds_feed")
                            .from(BroadcastFeeds::Table, BroadcastFeeds::FeedId)
                            .to(Feeds::Table, Feeds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            BroadcastFeeds::Table.into_iden(),
            Broadcasts::Table.into_iden(),
            Feeds::Table.into_iden(),
            Posts::Table.into_iden(),
            UserDetails::Table.into_iden(),
            Users::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Firstname,
    Surname,
    Email,
    Phone,
    GradYear,
}

#[derive(DeriveIden)]
enum UserDetails {
    Table,
    Id,
    Login,
    PasswordHash,
    Role,
    UserId,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    UserId,
    ThreadId,
    Title,
    Body,
    Anonymous,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Feeds {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Broadcasts {
    Table,
    Id,
    UserId,
    Content,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BroadcastFeeds {
    Table,
    BroadcastId,
    FeedId,
}
