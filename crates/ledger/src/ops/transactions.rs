use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::debug;

use crate::{
    EngineError, Mutation, NewTransaction, ResultEngine, Transaction, TransactionPatch,
    transactions,
    util::{apply_optional_text_patch, normalize_optional_text, normalize_required_text},
};

use super::{Engine, aggregates::refresh_group_hint, with_tx};

/// An updated transaction together with the group it left, if it moved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionUpdate {
    pub transaction: Transaction,
    pub previous_group_id: Option<String>,
}

impl Engine {
    /// Record an income or expense.
    ///
    /// When `group_id` is set the group must belong to the same
    /// organization; its total hint is refreshed in the same DB transaction.
    pub async fn new_transaction(&self, cmd: NewTransaction) -> ResultEngine<Mutation<Transaction>> {
        let category = normalize_required_text(&cmd.category, "category")?;
        let transaction = Transaction::new(
            cmd.organization_id,
            cmd.kind,
            cmd.amount,
            category,
            cmd.date,
            normalize_optional_text(cmd.notes.as_deref()),
            cmd.group_id,
        )?;

        with_tx!(self, |db_tx| {
            self.require_organization(&db_tx, &transaction.organization_id)
                .await?;
            if let Some(group_id) = transaction.group_id.as_deref() {
                self.require_group_in_organization(&db_tx, &transaction.organization_id, group_id)
                    .await?;
            }

            let model: transactions::ActiveModel = (&transaction).into();
            model.insert(&db_tx).await?;
            if let Some(group_id) = transaction.group_id.as_deref() {
                refresh_group_hint(&db_tx, group_id).await?;
            }
            Ok::<_, EngineError>(())
        })?;
        debug!(
            transaction_id = %transaction.id,
            organization_id = %transaction.organization_id,
            kind = transaction.kind.as_str(),
            amount = transaction.amount.minor(),
            "transaction created"
        );

        let organization_id = transaction.organization_id.clone();
        let group_id = transaction.group_id.clone();
        Ok(Mutation::new(transaction).affects_transaction(&organization_id, group_id.as_deref()))
    }

    pub async fn transaction(
        &self,
        organization_id: &str,
        transaction_id: &str,
    ) -> ResultEngine<Transaction> {
        self.require_transaction_in_organization(&self.database, organization_id, transaction_id)
            .await?
            .try_into()
    }

    /// Apply `patch` to a transaction. Moving it between groups refreshes the
    /// hints of both groups.
    pub async fn update_transaction(
        &self,
        organization_id: &str,
        transaction_id: &str,
        patch: TransactionPatch,
    ) -> ResultEngine<Mutation<TransactionUpdate>> {
        let update = with_tx!(self, |db_tx| {
            let current: Transaction = self
                .require_transaction_in_organization(&db_tx, organization_id, transaction_id)
                .await?
                .try_into()?;
            let previous_group_id = current.group_id.clone();

            let mut updated = current;
            if let Some(kind) = patch.kind {
                updated.kind = kind;
            }
            if let Some(amount) = patch.amount {
                updated.amount = amount.storable("amount")?;
            }
            if let Some(category) = patch.category.as_deref() {
                updated.category = normalize_required_text(category, "category")?;
            }
            if let Some(date) = patch.date {
                updated.date = date;
            }
            updated.notes = apply_optional_text_patch(updated.notes, patch.notes.as_deref());
            if let Some(group_id) = patch.group_id {
                if let Some(group_id) = group_id.as_deref() {
                    self.require_group_in_organization(&db_tx, organization_id, group_id)
                        .await?;
                }
                updated.group_id = group_id;
            }

            let model: transactions::ActiveModel = (&updated).into();
            model.update(&db_tx).await?;

            if let Some(group_id) = previous_group_id.as_deref() {
                refresh_group_hint(&db_tx, group_id).await?;
            }
            if let Some(group_id) = updated.group_id.as_deref()
                && previous_group_id.as_deref() != Some(group_id)
            {
                refresh_group_hint(&db_tx, group_id).await?;
            }

            Ok::<_, EngineError>(TransactionUpdate {
                transaction: updated,
                previous_group_id,
            })
        })?;
        debug!(transaction_id, organization_id, "transaction updated");

        let new_group_id = update.transaction.group_id.clone();
        let previous_group_id = update.previous_group_id.clone();
        Ok(Mutation::new(update)
            .affects_transaction(organization_id, previous_group_id.as_deref())
            .affects_transaction(organization_id, new_group_id.as_deref()))
    }

    /// Delete a transaction and return it.
    pub async fn delete_transaction(
        &self,
        organization_id: &str,
        transaction_id: &str,
    ) -> ResultEngine<Mutation<Transaction>> {
        let deleted = with_tx!(self, |db_tx| {
            let model = self
                .require_transaction_in_organization(&db_tx, organization_id, transaction_id)
                .await?;
            let deleted = Transaction::try_from(model)?;

            transactions::Entity::delete_by_id(transaction_id.to_string())
                .exec(&db_tx)
                .await?;
            if let Some(group_id) = deleted.group_id.as_deref() {
                refresh_group_hint(&db_tx, group_id).await?;
            }
            Ok::<_, EngineError>(deleted)
        })?;
        debug!(transaction_id, organization_id, "transaction deleted");

        let group_id = deleted.group_id.clone();
        Ok(Mutation::new(deleted).affects_transaction(organization_id, group_id.as_deref()))
    }

    /// All transactions of an organization, newest first.
    pub async fn transactions(&self, organization_id: &str) -> ResultEngine<Vec<Transaction>> {
        self.require_organization(&self.database, organization_id)
            .await?;
        let models = transactions::Entity::find()
            .filter(transactions::Column::OrganizationId.eq(organization_id.to_string()))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Transaction::try_from).collect()
    }

    /// Transactions tagged with `group_id`, newest first.
    pub async fn group_transactions(
        &self,
        organization_id: &str,
        group_id: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        self.require_group_in_organization(&self.database, organization_id, group_id)
            .await?;
        let models = transactions::Entity::find()
            .filter(transactions::Column::OrganizationId.eq(organization_id.to_string()))
            .filter(transactions::Column::GroupId.eq(group_id.to_string()))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Transaction::try_from).collect()
    }
}
