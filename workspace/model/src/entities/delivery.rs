use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

/// A dated fact: quantity of a good delivered to a school. Append-only;
/// there is no update or delete path.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "entregas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// References `escolas.id`, but deletes there do not cascade here:
    /// removing a school leaves this row with a dangling id.
    #[sea_orm(column_name = "escola_id")]
    pub school_id: i32,
    /// Same dangling-on-delete behavior as `school_id`.
    #[sea_orm(column_name = "mercadoria_id")]
    pub good_id: i32,
    #[sea_orm(column_name = "data")]
    pub date: NaiveDate,
    #[sea_orm(column_name = "quantidade")]
    pub quantity: i32,
    #[sea_orm(column_name = "usuario_id")]
    pub owner_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::school::Entity",
        from = "Column::SchoolId",
        to = "super::school::Column::Id"
    )]
    School,
    #[sea_orm(
        belongs_to = "super::good::Entity",
        from = "Column::GoodId",
        to = "super::good::Column::Id"
    )]
    Good,
}

impl ActiveModelBehavior for ActiveModel {}
