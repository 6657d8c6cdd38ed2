//! Give/take obligations and their settlement.
//!
//! Writes to an existing obligation go through a compare-and-set on the
//! `version` column: the row is read, the new state is computed and checked
//! against that read, and the write only lands if nobody bumped the version
//! in between. A lost race re-reads and re-validates.

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    CacheKey, EngineError, Money, Mutation, NewObligation, Obligation, ObligationPatch,
    ResultEngine, Transaction, obligations, transactions,
    util::{apply_optional_text_patch, normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

/// How many times a compare-and-set write is attempted before giving up with
/// [`EngineError::Conflict`].
pub const SETTLE_MAX_ATTEMPTS: u32 = 5;

/// Outcome of [`Engine::settle`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub obligation: Obligation,
    /// The transaction recording the payment, when one was requested.
    pub transaction: Option<Transaction>,
}

/// Writes every mutable column of `obligation` if the stored row is still at
/// `version`. Returns whether the row was written.
async fn write_if_unchanged<C: ConnectionTrait>(
    db: &C,
    obligation: &Obligation,
    version: i64,
) -> ResultEngine<bool> {
    let mut model: obligations::ActiveModel = obligation.into();
    model.id = ActiveValue::NotSet;
    model.organization_id = ActiveValue::NotSet;
    model.created_at = ActiveValue::NotSet;
    model.version = ActiveValue::Set(version + 1);

    let result = obligations::Entity::update_many()
        .set(model)
        .filter(obligations::Column::Id.eq(obligation.id.clone()))
        .filter(obligations::Column::Version.eq(version))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

fn obligation_keys(organization_id: &str) -> [CacheKey; 2] {
    [
        CacheKey::OrganizationObligations(organization_id.to_string()),
        CacheKey::OrganizationStats(organization_id.to_string()),
    ]
}

impl Engine {
    pub async fn new_obligation(&self, cmd: NewObligation) -> ResultEngine<Mutation<Obligation>> {
        let person_name = normalize_required_text(&cmd.person_name, "person_name")?;
        let obligation = Obligation::new(
            cmd.organization_id,
            person_name,
            cmd.amount,
            cmd.kind,
            cmd.due_date,
            normalize_optional_text(cmd.notes.as_deref()),
        )?;

        self.require_organization(&self.database, &obligation.organization_id)
            .await?;
        let model: obligations::ActiveModel = (&obligation).into();
        model.insert(&self.database).await?;
        debug!(
            obligation_id = %obligation.id,
            organization_id = %obligation.organization_id,
            kind = obligation.kind.as_str(),
            amount = obligation.amount.minor(),
            "obligation created"
        );

        let keys = obligation_keys(&obligation.organization_id);
        Ok(Mutation::new(obligation).affects_all(keys))
    }

    pub async fn obligation(
        &self,
        organization_id: &str,
        obligation_id: &str,
    ) -> ResultEngine<Obligation> {
        self.require_obligation_in_organization(&self.database, organization_id, obligation_id)
            .await?
            .try_into()
    }

    /// Obligations of an organization, newest first.
    pub async fn obligations(&self, organization_id: &str) -> ResultEngine<Vec<Obligation>> {
        self.require_organization(&self.database, organization_id)
            .await?;
        let models = obligations::Entity::find()
            .filter(obligations::Column::OrganizationId.eq(organization_id.to_string()))
            .order_by_desc(obligations::Column::CreatedAt)
            .order_by_desc(obligations::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Obligation::try_from).collect()
    }

    /// Edit an obligation. Status is re-derived from the resulting amount and
    /// the untouched settled amount.
    pub async fn update_obligation(
        &self,
        organization_id: &str,
        obligation_id: &str,
        patch: ObligationPatch,
    ) -> ResultEngine<Mutation<Obligation>> {
        let person_name = patch
            .person_name
            .as_deref()
            .map(|name| normalize_required_text(name, "person_name"))
            .transpose()?;

        for attempt in 1..=SETTLE_MAX_ATTEMPTS {
            let model = self
                .require_obligation_in_organization(&self.database, organization_id, obligation_id)
                .await?;
            let version = model.version;
            let current = Obligation::try_from(model)?;

            let mut updated = match patch.amount {
                Some(amount) => current.with_amount(amount)?,
                None => current,
            };
            if let Some(person_name) = person_name.clone() {
                updated.person_name = person_name;
            }
            if let Some(kind) = patch.kind {
                updated.kind = kind;
            }
            if let Some(due_date) = patch.due_date {
                updated.due_date = due_date;
            }
            updated.notes = apply_optional_text_patch(updated.notes, patch.notes.as_deref());

            if write_if_unchanged(&self.database, &updated, version).await? {
                debug!(obligation_id, organization_id, "obligation updated");
                return Ok(Mutation::new(updated).affects_all(obligation_keys(organization_id)));
            }
            warn!(obligation_id, attempt, "obligation changed concurrently, retrying update");
        }

        Err(EngineError::Conflict(format!(
            "obligation \"{obligation_id}\" kept changing, update abandoned"
        )))
    }

    pub async fn delete_obligation(
        &self,
        organization_id: &str,
        obligation_id: &str,
    ) -> ResultEngine<Mutation<Obligation>> {
        let model = self
            .require_obligation_in_organization(&self.database, organization_id, obligation_id)
            .await?;
        let deleted = Obligation::try_from(model)?;
        obligations::Entity::delete_by_id(obligation_id.to_string())
            .exec(&self.database)
            .await?;
        debug!(obligation_id, organization_id, "obligation deleted");

        Ok(Mutation::new(deleted).affects_all(obligation_keys(organization_id)))
    }

    /// Settle `amount` of an obligation, optionally recording the payment as
    /// a `Debt Settlement` transaction.
    ///
    /// The obligation write and the transaction insert share one DB
    /// transaction. Over-settlement is a validation error, checked against
    /// the state the write is conditioned on.
    pub async fn settle(
        &self,
        organization_id: &str,
        obligation_id: &str,
        amount: Money,
        record_as_transaction: bool,
    ) -> ResultEngine<Mutation<Settlement>> {
        amount.storable("settle_amount")?;

        for attempt in 1..=SETTLE_MAX_ATTEMPTS {
            let model = self
                .require_obligation_in_organization(&self.database, organization_id, obligation_id)
                .await?;
            let version = model.version;
            let current = Obligation::try_from(model)?;

            let settled = current.settled_by(amount)?;
            let transaction = if record_as_transaction {
                Some(settled.settlement_transaction(amount, Utc::now())?)
            } else {
                None
            };

            let applied = with_tx!(self, |db_tx| {
                let applied = write_if_unchanged(&db_tx, &settled, version).await?;
                if applied && let Some(transaction) = transaction.as_ref() {
                    let model: transactions::ActiveModel = transaction.into();
                    model.insert(&db_tx).await?;
                }
                Ok::<_, EngineError>(applied)
            })?;

            if applied {
                debug!(
                    obligation_id,
                    organization_id,
                    amount = amount.minor(),
                    status = settled.status.as_str(),
                    recorded = transaction.is_some(),
                    "obligation settled"
                );
                let mut mutation = Mutation::new(()).affects_all(obligation_keys(organization_id));
                if transaction.is_some() {
                    mutation = mutation.affects_transaction(organization_id, None);
                }
                return Ok(mutation.map(|()| Settlement {
                    obligation: settled,
                    transaction,
                }));
            }
            warn!(obligation_id, attempt, "obligation changed concurrently, retrying settlement");
        }

        Err(EngineError::Conflict(format!(
            "obligation \"{obligation_id}\" kept changing, settlement abandoned"
        )))
    }
}
