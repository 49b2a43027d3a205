//! Reference currency data.
//!
//! The engine only reads this table. Rows are provisioned by the initial
//! migration (a handful of common codes) or whatever step owns the
//! reference data in a given deployment.

use sea_orm::entity::prelude::*;

use crate::{EngineError, ResultEngine};

/// A currency as known to the reference table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Currency {
    /// ISO-4217 style code, uppercase.
    pub code: String,
    pub name: String,
    pub symbol: Option<String>,
    /// Number of minor-unit digits (2 for EUR, 0 for JPY).
    pub minor_unit: i32,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "currencies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub name: String,
    pub symbol: Option<String>,
    pub minor_unit: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Currency {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        Ok(Currency {
            code: value.code,
            name: value.name,
            symbol: value.symbol,
            minor_unit: value.minor_unit,
        })
    }
}
