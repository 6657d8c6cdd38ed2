use ledger::{
    CacheKey, EngineError, NewGroup, NewObligation, NewOrganization, NewTransaction,
    ObligationKind, OrganizationPatch,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

mod common;

use common::{day, engine_with_db, engine_with_file_db, money, organization};

async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

#[tokio::test]
async fn only_the_owner_can_delete_an_organization() {
    let (engine, _db) = engine_with_db().await;
    let family = organization(&engine, "u1", "Family").await;
    assert!(!family.is_personal);

    let err = engine.delete_organization(&family.id, "u2").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let deleted = engine.delete_organization(&family.id, "u1").await.unwrap();
    assert!(
        deleted
            .affected
            .contains(&CacheKey::UserOrganizations("u1".to_string()))
    );

    let err = engine.organization(&family.id).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotFound { entity: "organization", ref id } if *id == family.id
    ));
}

#[tokio::test]
async fn deleting_an_organization_removes_what_it_owns() {
    let (engine, db) = engine_with_db().await;
    let family = organization(&engine, "u1", "Family").await;
    let other = organization(&engine, "u1", "Work").await;

    let trip = engine
        .new_group(NewGroup::new(&family.id, "Trip", day(1)))
        .await
        .unwrap()
        .value;
    engine
        .new_transaction(NewTransaction::expense(&family.id, money(500), "Food", day(2)).group(&trip.id))
        .await
        .unwrap();
    engine
        .new_transaction(NewTransaction::income(&other.id, money(900), "Salary", day(2)))
        .await
        .unwrap();
    engine
        .new_obligation(NewObligation::new(&family.id, "Rahim", money(100), ObligationKind::Give))
        .await
        .unwrap();

    let deleted = engine.delete_organization(&family.id, "u1").await.unwrap();
    assert!(deleted.affected.contains(&CacheKey::Group(trip.id.clone())));
    assert!(
        deleted
            .affected
            .contains(&CacheKey::OrganizationObligations(family.id.clone()))
    );

    assert_eq!(count_rows(&db, "transactions").await, 1);
    assert_eq!(count_rows(&db, "groups").await, 0);
    assert_eq!(count_rows(&db, "obligations").await, 0);
    assert_eq!(engine.transactions(&other.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn personal_organization_cannot_be_renamed_or_deleted() {
    let (engine, _db) = engine_with_db().await;
    let personal = engine
        .ensure_default_personal("u1")
        .await
        .unwrap()
        .value
        .unwrap();

    let err = engine
        .rename_organization(&personal.id, "Mine", "u1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { field: "name", .. }));

    // Renaming to the current name, however it is spelled, is still a rename.
    for same in ["Personal", "  Personal "] {
        let err = engine
            .rename_organization(&personal.id, same, "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { field: "name", .. }));
    }
    let err = engine
        .update_organization(
            &personal.id,
            OrganizationPatch::default().name("Personal").currency("USD"),
            "u1",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { field: "name", .. }));
    assert_eq!(
        engine.organization(&personal.id).await.unwrap().currency,
        "BDT"
    );

    let err = engine
        .delete_organization(&personal.id, "u1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));

    // Ownership is checked before the personal rule.
    let err = engine
        .rename_organization(&personal.id, "Mine", "u2")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    // The currency label stays editable.
    let updated = engine
        .update_organization(&personal.id, OrganizationPatch::default().currency("EUR"), "u1")
        .await
        .unwrap()
        .value;
    assert_eq!(updated.currency, "EUR");
    assert_eq!(updated.name, "Personal");
}

#[tokio::test]
async fn rename_normalizes_and_rejects_blank_names() {
    let (engine, _db) = engine_with_db().await;
    let family = organization(&engine, "u1", "Family").await;

    let renamed = engine
        .rename_organization(&family.id, "  Home  ", "u1")
        .await
        .unwrap();
    assert_eq!(renamed.value.name, "Home");
    assert_eq!(
        renamed.affected_keys(),
        vec!["organizations:user:u1".to_string()]
    );

    let err = engine
        .rename_organization(&family.id, "   ", "u1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { field: "name", .. }));

    let err = engine
        .rename_organization("missing", "Home", "u1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "organization", .. }));
}

#[tokio::test]
async fn new_organization_defaults_currency() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .new_organization(NewOrganization::new("u1", "Family"))
        .await
        .unwrap();
    assert_eq!(created.value.currency, "BDT");
    assert_eq!(created.value.owner_id, "u1");
    assert_eq!(
        created.affected,
        vec![CacheKey::UserOrganizations("u1".to_string())]
    );

    let eur = engine
        .new_organization(NewOrganization::new("u1", "Trip fund").currency("EUR"))
        .await
        .unwrap()
        .value;
    assert_eq!(eur.currency, "EUR");

    let err = engine
        .new_organization(NewOrganization::new("u1", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { field: "name", .. }));
}

#[tokio::test]
async fn lists_only_the_users_organizations_oldest_first() {
    let (engine, _db) = engine_with_db().await;
    let first = organization(&engine, "u1", "First").await;
    let second = organization(&engine, "u1", "Second").await;
    organization(&engine, "u2", "Someone else").await;

    let listed = engine.organizations_for_user("u1").await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|org| org.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);

    assert!(engine.organizations_for_user("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn ensure_default_personal_creates_once() {
    let (engine, _db) = engine_with_db().await;

    let created = engine.ensure_default_personal("u1").await.unwrap();
    let personal = created.value.clone().unwrap();
    assert!(personal.is_personal);
    assert_eq!(personal.name, "Personal");
    assert_eq!(personal.currency, "BDT");
    assert_eq!(
        created.affected_keys(),
        vec!["organizations:user:u1".to_string()]
    );

    let again = engine.ensure_default_personal("u1").await.unwrap();
    assert_eq!(again.value.map(|org| org.id), Some(personal.id));
    assert!(again.affected.is_empty());
    assert_eq!(engine.organizations_for_user("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn ensure_default_personal_skips_users_with_organizations() {
    let (engine, _db) = engine_with_db().await;
    organization(&engine, "u1", "Family").await;

    let result = engine.ensure_default_personal("u1").await.unwrap();
    assert_eq!(result.value, None);
    assert!(result.affected.is_empty());
    assert_eq!(engine.organizations_for_user("u1").await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_first_access_creates_a_single_personal_organization() {
    let (engine, _db, path) = engine_with_file_db().await;

    let (a, b) = tokio::join!(
        engine.ensure_default_personal("u1"),
        engine.ensure_default_personal("u1")
    );
    let a = a.unwrap().value.unwrap();
    let b = b.unwrap().value.unwrap();
    assert_eq!(a.id, b.id);

    let listed = engine.organizations_for_user("u1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_personal);

    let _ = std::fs::remove_file(path);
}
