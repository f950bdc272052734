use sea_orm::entity::prelude::*;

/// A category of delivered merchandise.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "mercadorias")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Unique within one owner's scope.
    #[sea_orm(column_name = "nome")]
    pub name: String,
    #[sea_orm(column_name = "usuario_id")]
    pub owner_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
