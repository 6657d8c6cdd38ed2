//! Read-side aggregates: group totals and organization stats.
//!
//! Both are recomputed from stored records on every call. Nothing here reads
//! `groups.total_amount_minor`.

use std::collections::HashMap;

use sea_orm::{ConnectionTrait, QueryFilter, Statement, Value, prelude::*, sea_query::Expr};

use crate::{
    EngineError, GroupTotal, Money, ObligationKind, ObligationStatus, ResultEngine, Stats,
    TransactionKind, groups,
};

use super::Engine;

/// Runs a `SELECT kind, amount ...` statement and adds the amounts up per
/// kind. Missing kinds sum to zero.
///
/// The statements use `?` placeholders, so they only run on SQLite.
///
/// The addition happens here with [`Money::checked_add`] rather than in
/// `SUM`, so that a total leaving the `i64` range is reported as
/// [`EngineError::Overflow`] instead of a store error.
async fn sum_by_kind<C: ConnectionTrait>(
    db: &C,
    sql: &str,
    values: Vec<Value>,
) -> ResultEngine<HashMap<String, Money>> {
    let backend = db.get_database_backend();
    let rows = db
        .query_all(Statement::from_sql_and_values(backend, sql, values))
        .await?;

    let mut totals = HashMap::new();
    for row in rows {
        let kind: String = row.try_get("", "kind")?;
        let amount: i64 = row.try_get("", "amount")?;
        accumulate(&mut totals, kind, Money::new(amount))?;
    }
    Ok(totals)
}

fn accumulate(
    totals: &mut HashMap<String, Money>,
    kind: String,
    amount: Money,
) -> ResultEngine<()> {
    let total = totals.entry(kind).or_insert(Money::ZERO);
    let Some(sum) = total.checked_add(amount) else {
        return Err(EngineError::Overflow(format!(
            "{total} + {amount} does not fit in i64"
        )));
    };
    *total = sum;
    Ok(())
}

fn total_of(totals: &HashMap<String, Money>, kind: &str) -> Money {
    totals.get(kind).copied().unwrap_or(Money::ZERO)
}

/// Sums the transactions currently tagged with `group_id`.
pub(super) async fn compute_group_total<C: ConnectionTrait>(
    db: &C,
    group_id: &str,
) -> ResultEngine<GroupTotal> {
    let totals = sum_by_kind(
        db,
        "SELECT kind, amount_minor AS amount \
         FROM transactions \
         WHERE group_id = ?",
        vec![group_id.into()],
    )
    .await?;

    Ok(GroupTotal::new(
        total_of(&totals, TransactionKind::Income.as_str()),
        total_of(&totals, TransactionKind::Expense.as_str()),
    ))
}

/// Recomputes the net of `group_id` and stores it as the display hint.
pub(super) async fn refresh_group_hint<C: ConnectionTrait>(
    db: &C,
    group_id: &str,
) -> ResultEngine<()> {
    let total = compute_group_total(db, group_id).await?;
    groups::Entity::update_many()
        .col_expr(
            groups::Column::TotalAmountMinor,
            Expr::value(total.net.minor()),
        )
        .filter(groups::Column::Id.eq(group_id.to_string()))
        .exec(db)
        .await?;
    Ok(())
}

impl Engine {
    /// Income, expense and net of the transactions tagged with `group_id`.
    ///
    /// A group without transactions has a zero total.
    pub async fn group_total(
        &self,
        organization_id: &str,
        group_id: &str,
    ) -> ResultEngine<GroupTotal> {
        self.require_group_in_organization(&self.database, organization_id, group_id)
            .await?;
        compute_group_total(&self.database, group_id).await
    }

    /// Returns the organization summary: balance, income, expense and what is
    /// still pending on unsettled obligations.
    ///
    /// Transactions are counted once whatever their group.
    pub async fn statistics(&self, organization_id: &str) -> ResultEngine<Stats> {
        self.require_organization(&self.database, organization_id)
            .await?;

        let transaction_totals = sum_by_kind(
            &self.database,
            "SELECT kind, amount_minor AS amount \
             FROM transactions \
             WHERE organization_id = ?",
            vec![organization_id.into()],
        )
        .await?;

        let pending_totals = sum_by_kind(
            &self.database,
            "SELECT kind, amount_minor - settled_amount_minor AS amount \
             FROM obligations \
             WHERE organization_id = ? AND status != ?",
            vec![
                organization_id.into(),
                ObligationStatus::Settled.as_str().into(),
            ],
        )
        .await?;

        Ok(Stats::new(
            total_of(&transaction_totals, TransactionKind::Income.as_str()),
            total_of(&transaction_totals, TransactionKind::Expense.as_str()),
            total_of(&pending_totals, ObligationKind::Give.as_str()),
            total_of(&pending_totals, ObligationKind::Take.as_str()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_per_kind() {
        let mut totals = HashMap::new();
        accumulate(&mut totals, "income".to_string(), Money::new(100)).unwrap();
        accumulate(&mut totals, "income".to_string(), Money::new(50)).unwrap();
        accumulate(&mut totals, "expense".to_string(), Money::new(30)).unwrap();

        assert_eq!(total_of(&totals, "income"), Money::new(150));
        assert_eq!(total_of(&totals, "expense"), Money::new(30));
        assert_eq!(total_of(&totals, "give"), Money::ZERO);
    }

    #[test]
    fn overflowing_total_is_not_transient() {
        let mut totals = HashMap::new();
        let half = Money::new(i64::MAX / 2 + 1);
        accumulate(&mut totals, "income".to_string(), half).unwrap();

        let err = accumulate(&mut totals, "income".to_string(), half).unwrap_err();
        assert!(matches!(err, EngineError::Overflow(_)));
        assert!(!err.is_transient());
        assert_eq!(total_of(&totals, "income"), half);
    }
}
