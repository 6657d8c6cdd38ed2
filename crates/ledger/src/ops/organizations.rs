use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*,
};
use tracing::debug;

use crate::{
    CacheKey, DEFAULT_CURRENCY, EngineError, Mutation, NewOrganization, Organization,
    OrganizationPatch, ResultEngine, groups, obligations, organizations, transactions,
    util::normalize_required_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Organizations owned by `user_id`, oldest first.
    pub async fn organizations_for_user(&self, user_id: &str) -> ResultEngine<Vec<Organization>> {
        let models = organizations::Entity::find()
            .filter(organizations::Column::OwnerId.eq(user_id.to_string()))
            .order_by_asc(organizations::Column::CreatedAt)
            .order_by_asc(organizations::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Organization::from).collect())
    }

    pub async fn organization(&self, organization_id: &str) -> ResultEngine<Organization> {
        self.require_organization(&self.database, organization_id)
            .await
            .map(Organization::from)
    }

    /// Create a shared (non-personal) organization.
    pub async fn new_organization(
        &self,
        cmd: NewOrganization,
    ) -> ResultEngine<Mutation<Organization>> {
        let name = normalize_required_text(&cmd.name, "name")?;
        let currency = match cmd.currency.as_deref() {
            Some(currency) => normalize_required_text(currency, "currency")?,
            None => DEFAULT_CURRENCY.to_string(),
        };

        let organization = Organization::new(name, currency, &cmd.owner_id);
        let model: organizations::ActiveModel = (&organization).into();
        model.insert(&self.database).await?;
        debug!(
            organization_id = %organization.id,
            owner_id = %organization.owner_id,
            "organization created"
        );

        let owner = organization.owner_id.clone();
        Ok(Mutation::new(organization).affects(CacheKey::UserOrganizations(owner)))
    }

    /// Update name and/or currency. Only the owner may do it, and the
    /// personal organization keeps its name.
    pub async fn update_organization(
        &self,
        organization_id: &str,
        patch: OrganizationPatch,
        user_id: &str,
    ) -> ResultEngine<Mutation<Organization>> {
        let model = self
            .require_organization_owner(&self.database, organization_id, user_id)
            .await?;

        let name = patch
            .name
            .as_deref()
            .map(|name| normalize_required_text(name, "name"))
            .transpose()?;
        let currency = patch
            .currency
            .as_deref()
            .map(|currency| normalize_required_text(currency, "currency"))
            .transpose()?;

        // Any name in the patch counts, even the current one.
        if model.is_personal && name.is_some() {
            return Err(EngineError::validation(
                "name",
                "the personal organization cannot be renamed",
            ));
        }

        let mut active: organizations::ActiveModel = model.into();
        if let Some(name) = name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(currency) = currency {
            active.currency = ActiveValue::Set(currency);
        }
        let updated = Organization::from(active.update(&self.database).await?);
        debug!(organization_id = %updated.id, "organization updated");

        Ok(Mutation::new(updated).affects(CacheKey::UserOrganizations(user_id.to_string())))
    }

    pub async fn rename_organization(
        &self,
        organization_id: &str,
        name: &str,
        user_id: &str,
    ) -> ResultEngine<Mutation<Organization>> {
        self.update_organization(
            organization_id,
            OrganizationPatch::default().name(name),
            user_id,
        )
        .await
    }

    /// Delete a non-personal organization with everything it owns.
    pub async fn delete_organization(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> ResultEngine<Mutation<()>> {
        let group_ids = with_tx!(self, |db_tx| {
            let model = self
                .require_organization_owner(&db_tx, organization_id, user_id)
                .await?;
            if model.is_personal {
                return Err(EngineError::validation(
                    "organization",
                    "the personal organization cannot be deleted",
                ));
            }

            let group_ids: Vec<String> = groups::Entity::find()
                .filter(groups::Column::OrganizationId.eq(organization_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|group| group.id)
                .collect();

            transactions::Entity::delete_many()
                .filter(transactions::Column::OrganizationId.eq(organization_id.to_string()))
                .exec(&db_tx)
                .await?;
            groups::Entity::delete_many()
                .filter(groups::Column::OrganizationId.eq(organization_id.to_string()))
                .exec(&db_tx)
                .await?;
            obligations::Entity::delete_many()
                .filter(obligations::Column::OrganizationId.eq(organization_id.to_string()))
                .exec(&db_tx)
                .await?;
            organizations::Entity::delete_by_id(organization_id.to_string())
                .exec(&db_tx)
                .await?;

            Ok::<_, EngineError>(group_ids)
        })?;
        debug!(organization_id, groups = group_ids.len(), "organization deleted");

        let org = organization_id.to_string();
        let mut mutation = Mutation::new(())
            .affects(CacheKey::UserOrganizations(user_id.to_string()))
            .affects(CacheKey::OrganizationTransactions(org.clone()))
            .affects(CacheKey::OrganizationStats(org.clone()))
            .affects(CacheKey::OrganizationGroups(org.clone()))
            .affects(CacheKey::OrganizationObligations(org));
        for group_id in group_ids {
            mutation = mutation
                .affects(CacheKey::Group(group_id.clone()))
                .affects(CacheKey::GroupTransactions(group_id));
        }
        Ok(mutation)
    }

    /// Make sure a user who owns no organization gets its personal one.
    ///
    /// Returns the personal organization of `user_id`, if any, once the call
    /// is done. Concurrent calls for the same user create at most one: the
    /// loser of the race hits the unique index and reads the winner's row.
    pub async fn ensure_default_personal(
        &self,
        user_id: &str,
    ) -> ResultEngine<Mutation<Option<Organization>>> {
        let owned = organizations::Entity::find()
            .filter(organizations::Column::OwnerId.eq(user_id.to_string()))
            .count(&self.database)
            .await?;
        if owned > 0 {
            return Ok(Mutation::new(self.personal_organization(user_id).await?));
        }

        let personal = Organization::personal(user_id);
        let model: organizations::ActiveModel = (&personal).into();
        match model.insert(&self.database).await {
            Ok(_) => {
                debug!(user_id, organization_id = %personal.id, "personal organization created");
                Ok(Mutation::new(Some(personal))
                    .affects(CacheKey::UserOrganizations(user_id.to_string())))
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!(user_id, "personal organization created concurrently");
                Ok(Mutation::new(self.personal_organization(user_id).await?))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn personal_organization(&self, user_id: &str) -> ResultEngine<Option<Organization>> {
        let model = organizations::Entity::find()
            .filter(organizations::Column::OwnerId.eq(user_id.to_string()))
            .filter(organizations::Column::IsPersonal.eq(true))
            .one(&self.database)
            .await?;
        Ok(model.map(Organization::from))
    }
}
