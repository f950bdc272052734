use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A dated financial record attributed to a school. The good and description
/// are stored as the literal label text chosen at entry time, so renaming or
/// removing a catalog entry never rewrites history.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lancamentos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// References `escolas.id` without a foreign key; removing the school
    /// leaves this row behind.
    #[sea_orm(column_name = "escola_id")]
    pub school_id: i32,
    #[sea_orm(column_name = "data")]
    pub date: NaiveDate,
    #[sea_orm(column_name = "mercadoria")]
    pub good: String,
    #[sea_orm(column_name = "descricao")]
    pub description: String,
    /// Both sides are independently optional; the schema does not enforce
    /// exclusivity. Balance math treats a missing side as zero.
    #[sea_orm(column_name = "debito", column_type = "Decimal(Some((16, 4)))", nullable)]
    pub debit: Option<Decimal>,
    #[sea_orm(column_name = "credito", column_type = "Decimal(Some((16, 4)))", nullable)]
    pub credit: Option<Decimal>,
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
}

impl ActiveModelBehavior for ActiveModel {}
