use ledger::{
    EngineError, Money, NewGroup, NewObligation, NewTransaction, ObligationKind, Stats,
};
use sea_orm::{ConnectionTrait, DbBackend, Statement, Value};

mod common;

use common::{day, engine_with_db, money, organization};

#[tokio::test]
async fn empty_organization_has_zero_stats() {
    let (engine, _db) = engine_with_db().await;
    let org = organization(&engine, "u1", "Family").await;

    assert_eq!(engine.statistics(&org.id).await.unwrap(), Stats::default());

    let err = engine.statistics("missing").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "organization", .. }));
}

#[tokio::test]
async fn summarizes_transactions_and_pending_obligations() {
    let (engine, _db) = engine_with_db().await;
    let org = organization(&engine, "u1", "Family").await;

    engine
        .new_transaction(NewTransaction::income(&org.id, money(1000), "Salary", day(1)))
        .await
        .unwrap();
    engine
        .new_transaction(NewTransaction::expense(&org.id, money(300), "Food", day(2)))
        .await
        .unwrap();
    engine
        .new_obligation(NewObligation::new(&org.id, "Karim", money(150), ObligationKind::Take))
        .await
        .unwrap();

    let stats = engine.statistics(&org.id).await.unwrap();
    assert_eq!(
        stats,
        Stats {
            current_balance: money(700),
            total_income: money(1000),
            total_expense: money(300),
            pending_to_give: money(0),
            pending_to_take: money(150),
        }
    );
}

#[tokio::test]
async fn pending_counts_only_what_is_still_owed() {
    let (engine, _db) = engine_with_db().await;
    let org = organization(&engine, "u1", "Family").await;

    let partial = engine
        .new_obligation(NewObligation::new(&org.id, "Rahim", money(400), ObligationKind::Give))
        .await
        .unwrap()
        .value;
    let settled = engine
        .new_obligation(NewObligation::new(&org.id, "Sara", money(80), ObligationKind::Give))
        .await
        .unwrap()
        .value;
    engine
        .settle(&org.id, &partial.id, money(150), false)
        .await
        .unwrap();
    engine
        .settle(&org.id, &settled.id, money(80), false)
        .await
        .unwrap();

    let stats = engine.statistics(&org.id).await.unwrap();
    assert_eq!(stats.pending_to_give, money(250));
    assert_eq!(stats.pending_to_take, money(0));
    // Settling without recording leaves the ledger untouched.
    assert_eq!(stats.current_balance, money(0));
}

#[tokio::test]
async fn recorded_settlements_move_the_balance() {
    let (engine, _db) = engine_with_db().await;
    let org = organization(&engine, "u1", "Family").await;
    let loan = engine
        .new_obligation(NewObligation::new(&org.id, "Karim", money(500), ObligationKind::Take))
        .await
        .unwrap()
        .value;

    engine
        .settle(&org.id, &loan.id, money(200), true)
        .await
        .unwrap();

    let stats = engine.statistics(&org.id).await.unwrap();
    assert_eq!(stats.total_income, money(200));
    assert_eq!(stats.current_balance, money(200));
    assert_eq!(stats.pending_to_take, money(300));
}

#[tokio::test]
async fn grouped_transactions_are_counted_once() {
    let (engine, _db) = engine_with_db().await;
    let family = organization(&engine, "u1", "Family").await;
    let work = organization(&engine, "u1", "Work").await;
    let group = engine
        .new_group(NewGroup::new(&family.id, "Trip", day(1)))
        .await
        .unwrap()
        .value;

    engine
        .new_transaction(NewTransaction::income(&family.id, money(500), "Pool", day(2)).group(&group.id))
        .await
        .unwrap();

    let stats = engine.statistics(&family.id).await.unwrap();
    assert_eq!(stats.total_income, money(500));
    assert_eq!(
        engine.group_total(&family.id, &group.id).await.unwrap().net,
        money(500)
    );
    assert_eq!(engine.statistics(&work.id).await.unwrap(), Stats::default());
}

#[tokio::test]
async fn amounts_up_to_the_cap_aggregate_exactly() {
    let (engine, _db) = engine_with_db().await;
    let org = organization(&engine, "u1", "Family").await;

    for _ in 0..3 {
        engine
            .new_transaction(NewTransaction::income(&org.id, Money::MAX, "Sale", day(1)))
            .await
            .unwrap();
    }
    engine
        .new_transaction(NewTransaction::expense(&org.id, Money::MAX, "Land", day(2)))
        .await
        .unwrap();

    let err = engine
        .new_transaction(NewTransaction::income(
            &org.id,
            money(Money::MAX.minor() + 1),
            "Sale",
            day(3),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { field: "amount", .. }));

    let stats = engine.statistics(&org.id).await.unwrap();
    assert_eq!(stats.total_income, money(3 * Money::MAX.minor()));
    assert_eq!(stats.current_balance, money(2 * Money::MAX.minor()));
}

#[tokio::test]
async fn overflowing_totals_are_reported_as_permanent() {
    let (engine, db) = engine_with_db().await;
    let org = organization(&engine, "u1", "Family").await;
    let group = engine
        .new_group(NewGroup::new(&org.id, "Import", day(1)))
        .await
        .unwrap()
        .value;

    // Rows written around the engine, e.g. by an import, are not capped.
    for id in ["imported-1", "imported-2"] {
        db.execute(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "INSERT INTO transactions (id, organization_id, kind, amount_minor, category, date, group_id) \
             VALUES (?, ?, 'income', ?, 'Import', ?, ?)",
            [
                Value::from(id),
                Value::from(org.id.clone()),
                Value::from(i64::MAX / 2 + 1),
                Value::from(day(1)),
                Value::from(group.id.clone()),
            ],
        ))
        .await
        .unwrap();
    }

    let err = engine.statistics(&org.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Overflow(_)));
    assert!(!err.is_transient());

    let err = engine.group_total(&org.id, &group.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Overflow(_)));
}
