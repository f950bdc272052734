use sea_orm::entity::prelude::*;

/// An account holder. Every school, good, description, delivery and ledger
/// entry belongs to exactly one user; no query crosses that boundary.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "usuarios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "nome")]
    pub name: String,
    /// Looked up case-insensitively at login; the unique index is on the
    /// stored spelling, so registration checks the lowered form first.
    #[sea_orm(unique)]
    pub email: String,
    /// Salted PBKDF2 hash string, never the raw password.
    #[sea_orm(column_name = "senha")]
    pub password_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::school::Entity")]
    School,
    #[sea_orm(has_many = "super::good::Entity")]
    Good,
    #[sea_orm(has_many = "super::description::Entity")]
    Description,
}

impl ActiveModelBehavior for ActiveModel {}
