use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::debug;

use crate::{
    CacheKey, EngineError, Group, GroupPatch, Mutation, NewGroup, ResultEngine,
    groups::{self, validate_period},
    transactions,
    util::{apply_optional_text_patch, normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn new_group(&self, cmd: NewGroup) -> ResultEngine<Mutation<Group>> {
        let title = normalize_required_text(&cmd.title, "title")?;
        let group = Group::new(
            cmd.organization_id,
            title,
            normalize_optional_text(cmd.description.as_deref()),
            cmd.start_date,
            cmd.end_date,
        )?;

        self.require_organization(&self.database, &group.organization_id)
            .await?;
        let model: groups::ActiveModel = (&group).into();
        model.insert(&self.database).await?;
        debug!(group_id = %group.id, organization_id = %group.organization_id, "group created");

        let organization_id = group.organization_id.clone();
        Ok(Mutation::new(group).affects(CacheKey::OrganizationGroups(organization_id)))
    }

    pub async fn group(&self, organization_id: &str, group_id: &str) -> ResultEngine<Group> {
        self.require_group_in_organization(&self.database, organization_id, group_id)
            .await
            .map(Group::from)
    }

    /// Groups of an organization, most recent start first.
    pub async fn groups(&self, organization_id: &str) -> ResultEngine<Vec<Group>> {
        self.require_organization(&self.database, organization_id)
            .await?;
        let models = groups::Entity::find()
            .filter(groups::Column::OrganizationId.eq(organization_id.to_string()))
            .order_by_desc(groups::Column::StartDate)
            .order_by_desc(groups::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Group::from).collect())
    }

    pub async fn update_group(
        &self,
        organization_id: &str,
        group_id: &str,
        patch: GroupPatch,
    ) -> ResultEngine<Mutation<Group>> {
        let mut group: Group = self
            .require_group_in_organization(&self.database, organization_id, group_id)
            .await?
            .into();

        if let Some(title) = patch.title.as_deref() {
            group.title = normalize_required_text(title, "title")?;
        }
        group.description = apply_optional_text_patch(group.description, patch.description.as_deref());
        if let Some(start_date) = patch.start_date {
            group.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            group.end_date = end_date;
        }
        validate_period(group.start_date, group.end_date)?;

        // The hint column is owned by the transaction writes.
        let mut model: groups::ActiveModel = (&group).into();
        model.total_amount_minor = ActiveValue::NotSet;
        let group = Group::from(model.update(&self.database).await?);
        debug!(group_id, organization_id, "group updated");

        Ok(Mutation::new(group)
            .affects(CacheKey::Group(group_id.to_string()))
            .affects(CacheKey::OrganizationGroups(organization_id.to_string())))
    }

    /// Delete a group. Its transactions are kept and become ungrouped.
    pub async fn delete_group(
        &self,
        organization_id: &str,
        group_id: &str,
    ) -> ResultEngine<Mutation<()>> {
        let ungrouped = with_tx!(self, |db_tx| {
            self.require_group_in_organization(&db_tx, organization_id, group_id)
                .await?;

            let ungrouped = transactions::Entity::update_many()
                .col_expr(
                    transactions::Column::GroupId,
                    Expr::value(Option::<String>::None),
                )
                .filter(transactions::Column::GroupId.eq(group_id.to_string()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            groups::Entity::delete_by_id(group_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok::<_, EngineError>(ungrouped)
        })?;
        debug!(group_id, organization_id, ungrouped, "group deleted");

        Ok(Mutation::new(())
            .affects(CacheKey::OrganizationGroups(organization_id.to_string()))
            .affects(CacheKey::Group(group_id.to_string()))
            .affects(CacheKey::GroupTransactions(group_id.to_string()))
            .affects(CacheKey::OrganizationTransactions(organization_id.to_string())))
    }
}
