//! Ledger engine for multi-tenant personal and group finances.
//!
//! Organizations own income/expense [`Transaction`]s, trip/project
//! [`Group`]s and give/take [`Obligation`]s. Aggregates ([`Stats`],
//! [`GroupTotal`]) are always recomputed from stored records; every write
//! returns a [`Mutation`] listing the [`CacheKey`]s it made stale.

pub use cache::{CacheKey, Mutation};
pub use commands::{
    GroupPatch, NewGroup, NewObligation, NewOrganization, NewTransaction, ObligationPatch,
    OrganizationPatch, TransactionPatch,
};
pub use error::EngineError;
pub use groups::{Group, GroupTotal};
pub use money::Money;
pub use obligations::{Obligation, ObligationKind, ObligationStatus, SETTLEMENT_CATEGORY};
pub use ops::{Engine, EngineBuilder, SETTLE_MAX_ATTEMPTS, Settlement, TransactionUpdate};
pub use organizations::{DEFAULT_CURRENCY, Organization, PERSONAL_ORGANIZATION_NAME};
pub use stats::Stats;
pub use transactions::{Transaction, TransactionKind};

mod cache;
mod commands;
mod error;
mod groups;
mod money;
mod obligations;
mod ops;
mod organizations;
mod stats;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
