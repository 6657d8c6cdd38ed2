//! A `Group` buckets transactions of a trip or project.
//!
//! The authoritative value of a group is always derived from its
//! transactions (see `Engine::group_total`). `total_amount` is a display hint
//! refreshed on writes and never read back for balance logic.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub total_amount: Money,
}

impl Group {
    pub fn new(
        organization_id: String,
        title: String,
        description: Option<String>,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
    ) -> ResultEngine<Self> {
        validate_period(start_date, end_date)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            organization_id,
            title,
            description,
            start_date,
            end_date,
            total_amount: Money::ZERO,
        })
    }
}

pub(crate) fn validate_period(
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
) -> ResultEngine<()> {
    if let Some(end_date) = end_date
        && end_date < start_date
    {
        return Err(EngineError::validation(
            "end_date",
            "end_date must not be before start_date",
        ));
    }
    Ok(())
}

/// Income, expense and net of the transactions tagged with a group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub income: Money,
    pub expense: Money,
    pub net: Money,
}

impl GroupTotal {
    pub fn new(income: Money, expense: Money) -> Self {
        Self {
            income,
            expense,
            net: income - expense,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTimeUtc,
    pub end_date: Option<DateTimeUtc>,
    pub total_amount_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Organization,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Group> for ActiveModel {
    fn from(group: &Group) -> Self {
        Self {
            id: ActiveValue::Set(group.id.clone()),
            organization_id: ActiveValue::Set(group.organization_id.clone()),
            title: ActiveValue::Set(group.title.clone()),
            description: ActiveValue::Set(group.description.clone()),
            start_date: ActiveValue::Set(group.start_date),
            end_date: ActiveValue::Set(group.end_date),
            total_amount_minor: ActiveValue::Set(group.total_amount.minor()),
        }
    }
}

impl From<Model> for Group {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            organization_id: model.organization_id,
            title: model.title,
            description: model.description,
            start_date: model.start_date,
            end_date: model.end_date,
            total_amount: Money::new(model.total_amount_minor),
        }
    }
}
