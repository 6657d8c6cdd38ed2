//! Command structs for engine operations.
//!
//! These types group parameters for create/update operations, keeping call
//! sites readable and avoiding long argument lists.
//!
//! Patches follow one convention for optional text: `None` keeps the stored
//! value, an empty (or whitespace-only) string clears it.

use chrono::{DateTime, Utc};

use crate::{Money, ObligationKind, TransactionKind};

/// Create a non-personal organization.
#[derive(Clone, Debug)]
pub struct NewOrganization {
    pub owner_id: String,
    pub name: String,
    pub currency: Option<String>,
}

impl NewOrganization {
    #[must_use]
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
            currency: None,
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}

/// Update an organization (owner-only).
#[derive(Clone, Debug, Default)]
pub struct OrganizationPatch {
    pub name: Option<String>,
    pub currency: Option<String>,
}

impl OrganizationPatch {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}

/// Create an income or expense transaction.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub organization_id: String,
    pub kind: TransactionKind,
    pub amount: Money,
    pub category: String,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub group_id: Option<String>,
}

impl NewTransaction {
    #[must_use]
    pub fn new(
        organization_id: impl Into<String>,
        kind: TransactionKind,
        amount: Money,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            kind,
            amount,
            category: category.into(),
            date,
            notes: None,
            group_id: None,
        }
    }

    #[must_use]
    pub fn income(
        organization_id: impl Into<String>,
        amount: Money,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self::new(organization_id, TransactionKind::Income, amount, category, date)
    }

    #[must_use]
    pub fn expense(
        organization_id: impl Into<String>,
        amount: Money,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self::new(organization_id, TransactionKind::Expense, amount, category, date)
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }
}

/// Update an existing transaction.
///
/// `group_id`: `None` keeps the current group, `Some(None)` removes the
/// transaction from its group, `Some(Some(id))` moves it to `id`.
#[derive(Clone, Debug, Default)]
pub struct TransactionPatch {
    pub kind: Option<TransactionKind>,
    pub amount: Option<Money>,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub group_id: Option<Option<String>>,
}

impl TransactionPatch {
    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(Some(group_id.into()));
        self
    }

    #[must_use]
    pub fn ungroup(mut self) -> Self {
        self.group_id = Some(None);
        self
    }
}

/// Create a trip/project group.
#[derive(Clone, Debug)]
pub struct NewGroup {
    pub organization_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl NewGroup {
    #[must_use]
    pub fn new(
        organization_id: impl Into<String>,
        title: impl Into<String>,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            title: title.into(),
            description: None,
            start_date,
            end_date: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

/// Update a group. `end_date: Some(None)` reopens the group.
#[derive(Clone, Debug, Default)]
pub struct GroupPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
}

impl GroupPatch {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    #[must_use]
    pub fn end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(Some(end_date));
        self
    }

    #[must_use]
    pub fn reopen(mut self) -> Self {
        self.end_date = Some(None);
        self
    }
}

/// Create a give/take obligation.
#[derive(Clone, Debug)]
pub struct NewObligation {
    pub organization_id: String,
    pub person_name: String,
    pub amount: Money,
    pub kind: ObligationKind,
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl NewObligation {
    #[must_use]
    pub fn new(
        organization_id: impl Into<String>,
        person_name: impl Into<String>,
        amount: Money,
        kind: ObligationKind,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            person_name: person_name.into(),
            amount,
            kind,
            due_date: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Update an obligation. Status and settled amount are not editable; status
/// is re-derived from the (possibly new) amount.
#[derive(Clone, Debug, Default)]
pub struct ObligationPatch {
    pub person_name: Option<String>,
    pub amount: Option<Money>,
    pub kind: Option<ObligationKind>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub notes: Option<String>,
}

impl ObligationPatch {
    #[must_use]
    pub fn person_name(mut self, person_name: impl Into<String>) -> Self {
        self.person_name = Some(person_name.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: ObligationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(Some(due_date));
        self
    }

    #[must_use]
    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
