//! Session entity model for Sea-ORM database interaction.
//!
//! Maps to the `sessions` table. The table carries no schema qualifier so the
//! same entity works against PostgreSQL and SQLite.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing a session in the database.
///
/// # Database Schema
///
/// | Column      | Type                    | Description                       |
/// |-------------|-------------------------|-----------------------------------|
/// | id          | TEXT (Primary Key)      | Session ID                        |
/// | data        | BYTEA / BLOB            | MessagePack encoded record        |
/// | expiry_date | TIMESTAMPTZ             | Session expiration timestamp      |
///
/// Expiry timestamps are always written in UTC so that ordering comparisons
/// also hold on backends that store them as text.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// The `tower_sessions::session::Id` rendered as a string.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    /// The MessagePack-serialized `tower_sessions::session::Record`.
    pub data: Vec<u8>,

    /// Rows past this instant are invisible to loads and removed by
    /// `delete_expired`.
    pub expiry_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
