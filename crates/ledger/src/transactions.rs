//! Transaction primitives.
//!
//! A `Transaction` is a single income or expense of an organization. The
//! amount is always stored positive; the sign is applied only when
//! aggregating (see [`TransactionKind::signed`]).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Effect of `amount` on a balance.
    pub fn signed(self, amount: Money) -> Money {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::validation(
                "type",
                format!("invalid transaction type: {other}"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub organization_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    pub category: String,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub group_id: Option<String>,
}

impl Transaction {
    pub fn new(
        organization_id: String,
        kind: TransactionKind,
        amount: Money,
        category: String,
        date: DateTime<Utc>,
        notes: Option<String>,
        group_id: Option<String>,
    ) -> ResultEngine<Self> {
        let amount = amount.storable("amount")?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            organization_id,
            kind,
            amount,
            category,
            date,
            notes,
            group_id,
        })
    }

    pub fn signed_amount(&self) -> Money {
        self.kind.signed(self.amount)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub organization_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub category: String,
    pub date: DateTimeUtc,
    pub notes: Option<String>,
    pub group_id: Option<String>,
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
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Group,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.clone()),
            organization_id: ActiveValue::Set(tx.organization_id.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.minor()),
            category: ActiveValue::Set(tx.category.clone()),
            date: ActiveValue::Set(tx.date),
            notes: ActiveValue::Set(tx.notes.clone()),
            group_id: ActiveValue::Set(tx.group_id.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: TransactionKind::try_from(model.kind.as_str())?,
            id: model.id,
            organization_id: model.organization_id,
            amount: Money::new(model.amount_minor),
            category: model.category,
            date: model.date,
            notes: model.notes,
            group_id: model.group_id,
        })
    }
}
