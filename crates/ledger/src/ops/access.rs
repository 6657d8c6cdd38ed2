use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};

use crate::{EngineError, ResultEngine, groups, obligations, organizations, transactions};

use super::Engine;

/// Generates a `require_*_in_organization` lookup for an entity scoped by
/// `organization_id`. Ids of another organization are reported as not found.
macro_rules! impl_require_in_organization {
    ($require_fn:ident, $entity:path, $model:ty, $org_col:expr, $label:literal) => {
        pub(super) async fn $require_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            organization_id: &str,
            target_id: &str,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(target_id.to_string())
                .filter($org_col.eq(organization_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::not_found($label, target_id))
        }
    };
}

impl Engine {
    impl_require_in_organization!(
        require_transaction_in_organization,
        transactions::Entity,
        transactions::Model,
        transactions::Column::OrganizationId,
        "transaction"
    );

    impl_require_in_organization!(
        require_group_in_organization,
        groups::Entity,
        groups::Model,
        groups::Column::OrganizationId,
        "group"
    );

    impl_require_in_organization!(
        require_obligation_in_organization,
        obligations::Entity,
        obligations::Model,
        obligations::Column::OrganizationId,
        "obligation"
    );

    pub(super) async fn require_organization<C: ConnectionTrait>(
        &self,
        db: &C,
        organization_id: &str,
    ) -> ResultEngine<organizations::Model> {
        organizations::Entity::find_by_id(organization_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::not_found("organization", organization_id))
    }

    /// Loads the organization and checks `user_id` owns it.
    pub(super) async fn require_organization_owner<C: ConnectionTrait>(
        &self,
        db: &C,
        organization_id: &str,
        user_id: &str,
    ) -> ResultEngine<organizations::Model> {
        let model = self.require_organization(db, organization_id).await?;
        if !model.is_owned_by(user_id) {
            return Err(EngineError::Forbidden(format!(
                "user \"{user_id}\" does not own organization \"{organization_id}\""
            )));
        }
        Ok(model)
    }
}
