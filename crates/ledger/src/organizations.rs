//! The `Organization` is a workspace that owns transactions, groups and
//! obligations. A user can own many organizations but only one personal one.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Name given to the personal workspace created on first access.
pub const PERSONAL_ORGANIZATION_NAME: &str = "Personal";
/// Currency label used when none is given.
pub const DEFAULT_CURRENCY: &str = "BDT";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    /// Display label only, never used for conversion.
    pub currency: String,
    pub owner_id: String,
    pub is_personal: bool,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(name: String, currency: String, owner_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            currency,
            owner_id: owner_id.to_string(),
            is_personal: false,
            created_at: Utc::now(),
        }
    }

    /// The default personal workspace of `owner_id`.
    pub fn personal(owner_id: &str) -> Self {
        Self {
            is_personal: true,
            ..Self::new(
                PERSONAL_ORGANIZATION_NAME.to_string(),
                DEFAULT_CURRENCY.to_string(),
                owner_id,
            )
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub currency: String,
    pub owner_id: String,
    pub is_personal: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::groups::Entity")]
    Groups,
    #[sea_orm(has_many = "super::obligations::Entity")]
    Obligations,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::obligations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Obligations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

impl From<&Organization> for ActiveModel {
    fn from(value: &Organization) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            currency: ActiveValue::Set(value.currency.clone()),
            owner_id: ActiveValue::Set(value.owner_id.clone()),
            is_personal: ActiveValue::Set(value.is_personal),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl From<Model> for Organization {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            currency: model.currency,
            owner_id: model.owner_id,
            is_personal: model.is_personal,
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personal_workspace_defaults() {
        let org = Organization::personal("u1");
        assert!(org.is_personal);
        assert_eq!(org.name, "Personal");
        assert_eq!(org.currency, "BDT");
    }

    #[test]
    fn ownership_is_by_user_id() {
        let org = Organization::personal("u1");
        let model = Model {
            id: org.id,
            name: org.name,
            currency: org.currency,
            owner_id: org.owner_id,
            is_personal: org.is_personal,
            created_at: org.created_at,
        };
        assert!(model.is_owned_by("u1"));
        assert!(!model.is_owned_by("u2"));
    }

    #[test]
    fn new_organizations_are_shared_workspaces() {
        let org = Organization::new("Family".to_string(), "EUR".to_string(), "u1");
        assert!(!org.is_personal);
        assert_ne!(org.id, Organization::personal("u1").id);
    }
}
