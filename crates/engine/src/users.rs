//! User rows.
//!
//! Users are created on first authenticated request; the engine only ever
//! reads them for membership checks.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Lowercased, unique.
    pub email: String,
    pub created_at: DateTimeUtc,
    pub last_seen_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budget_members::Entity")]
    BudgetMembers,
}

impl Related<super::budget_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
