//! Monthly category budgets.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, YearMonth, util::parse_uuid};

/// A spending limit for one category in one calendar month.
///
/// Several budgets may share the same `(user_id, category, month)`; each of
/// them is summarised on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: String,
    pub category: String,
    pub limit: Money,
    pub month: YearMonth,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub limit_minor: i64,
    pub month: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(budget: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(budget.id.to_string()),
            user_id: ActiveValue::Set(budget.user_id.clone()),
            category: ActiveValue::Set(budget.category.clone()),
            limit_minor: ActiveValue::Set(budget.limit.cents()),
            month: ActiveValue::Set(budget.month.to_string()),
            created_at: ActiveValue::Set(budget.created_at),
            updated_at: ActiveValue::Set(budget.updated_at),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            user_id: model.user_id,
            category: model.category,
            limit: Money::new(model.limit_minor),
            month: model.month.parse()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
