//! Give/take obligations.
//!
//! An `Obligation` records money the organization owes a person (`Give`) or
//! money a person owes the organization (`Take`). It is settled over time,
//! possibly in several partial payments.
//!
//! `status` is never an input: it is derived from `settled_amount` and
//! `amount` every time either of them changes (see
//! [`ObligationStatus::derive`]). The invariant `0 <= settled_amount <=
//! amount` holds for every value built by this module.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine, Transaction, TransactionKind};

/// Category of transactions emitted by a settlement.
pub const SETTLEMENT_CATEGORY: &str = "Debt Settlement";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    /// The organization owes the person (liability).
    Give,
    /// The person owes the organization (asset).
    Take,
}

impl ObligationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Give => "give",
            Self::Take => "take",
        }
    }

    /// Kind of the transaction that records a settlement: collecting a
    /// `Take` is income, paying a `Give` is an expense.
    pub fn settlement_kind(self) -> TransactionKind {
        match self {
            Self::Give => TransactionKind::Expense,
            Self::Take => TransactionKind::Income,
        }
    }
}

impl TryFrom<&str> for ObligationKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "give" => Ok(Self::Give),
            "take" => Ok(Self::Take),
            other => Err(EngineError::validation(
                "type",
                format!("invalid obligation type: {other}"),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationStatus {
    Pending,
    PartiallySettled,
    Settled,
}

impl ObligationStatus {
    /// The only way to obtain a status.
    pub fn derive(amount: Money, settled_amount: Money) -> Self {
        if settled_amount >= amount {
            Self::Settled
        } else if settled_amount.is_positive() {
            Self::PartiallySettled
        } else {
            Self::Pending
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PartiallySettled => "partially_settled",
            Self::Settled => "settled",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: String,
    pub organization_id: String,
    pub person_name: String,
    /// The original, full obligation.
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: ObligationKind,
    pub due_date: Option<DateTime<Utc>>,
    pub status: ObligationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub settled_amount: Money,
}

impl Obligation {
    pub fn new(
        organization_id: String,
        person_name: String,
        amount: Money,
        kind: ObligationKind,
        due_date: Option<DateTime<Utc>>,
        notes: Option<String>,
    ) -> ResultEngine<Self> {
        let amount = amount.storable("amount")?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            organization_id,
            person_name,
            amount,
            kind,
            due_date,
            status: ObligationStatus::Pending,
            notes,
            created_at: Utc::now(),
            settled_amount: Money::ZERO,
        })
    }

    /// What is still owed.
    pub fn remaining(&self) -> Money {
        self.amount - self.settled_amount
    }

    /// Returns a copy with `settle_amount` applied, or a validation error if
    /// `settle_amount` is not positive or exceeds what is still owed.
    pub fn settled_by(&self, settle_amount: Money) -> ResultEngine<Self> {
        let settle_amount = settle_amount.storable("settle_amount")?;
        let remaining = self.remaining();
        if settle_amount > remaining {
            return Err(EngineError::validation(
                "settle_amount",
                format!("settle amount {settle_amount} exceeds remaining {remaining}"),
            ));
        }
        let settled_amount = self
            .settled_amount
            .checked_add(settle_amount)
            .ok_or_else(|| EngineError::validation("settle_amount", "amount too large"))?;
        Ok(Self {
            settled_amount,
            status: ObligationStatus::derive(self.amount, settled_amount),
            ..self.clone()
        })
    }

    /// Returns a copy with a new full amount, keeping what was already
    /// settled. The new amount cannot go below `settled_amount`.
    pub fn with_amount(&self, amount: Money) -> ResultEngine<Self> {
        let amount = amount.storable("amount")?;
        if amount < self.settled_amount {
            return Err(EngineError::validation(
                "amount",
                format!(
                    "amount {amount} is below the already settled {}",
                    self.settled_amount
                ),
            ));
        }
        Ok(Self {
            amount,
            status: ObligationStatus::derive(amount, self.settled_amount),
            ..self.clone()
        })
    }

    /// The transaction recording a settlement of `settle_amount` at `date`.
    pub fn settlement_transaction(
        &self,
        settle_amount: Money,
        date: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let notes = match self.notes.as_deref() {
            Some(notes) => format!("Settlement for {} ({notes})", self.person_name),
            None => format!("Settlement for {}", self.person_name),
        };
        Transaction::new(
            self.organization_id.clone(),
            self.kind.settlement_kind(),
            settle_amount,
            SETTLEMENT_CATEGORY.to_string(),
            date,
            Some(notes),
            None,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "obligations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub organization_id: String,
    pub person_name: String,
    pub amount_minor: i64,
    pub kind: String,
    pub due_date: Option<DateTimeUtc>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub settled_amount_minor: i64,
    /// Bumped on every write; compare-and-set token.
    pub version: i64,
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
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Obligation> for ActiveModel {
    fn from(value: &Obligation) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            organization_id: ActiveValue::Set(value.organization_id.clone()),
            person_name: ActiveValue::Set(value.person_name.clone()),
            amount_minor: ActiveValue::Set(value.amount.minor()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            due_date: ActiveValue::Set(value.due_date),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
            settled_amount_minor: ActiveValue::Set(value.settled_amount.minor()),
            version: ActiveValue::Set(0),
        }
    }
}

impl TryFrom<Model> for Obligation {
    type Error = EngineError;

    /// The stored `status` column only serves queries; the returned status is
    /// derived again from the amounts.
    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let amount = Money::new(model.amount_minor);
        let settled_amount = Money::new(model.settled_amount_minor);
        if settled_amount.is_negative() || settled_amount > amount {
            return Err(EngineError::validation(
                "settled_amount",
                format!("stored obligation {} is out of bounds", model.id),
            ));
        }
        Ok(Self {
            kind: ObligationKind::try_from(model.kind.as_str())?,
            status: ObligationStatus::derive(amount, settled_amount),
            id: model.id,
            organization_id: model.organization_id,
            person_name: model.person_name,
            amount,
            due_date: model.due_date,
            notes: model.notes,
            created_at: model.created_at,
            settled_amount,
        })
    }
}
