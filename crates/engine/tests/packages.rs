use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Account, CreateAccountCmd, CreatePackageCmd, Engine, EngineError, PackageFilter,
    PackageStatus, ShippingMethod,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn seed_admin(db: &DatabaseConnection, engine: &Engine) -> Account {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO accounts (id, name, email, address, password, role, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            "Root".into(),
            "root@example.com".into(),
            "HQ".into(),
            "rootpw".into(),
            "admin".into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();
    engine
        .resolve_account("root@example.com", "rootpw")
        .await
        .unwrap()
}

async fn signup(engine: &Engine, name: &str, email: &str) -> Account {
    engine
        .create_account(CreateAccountCmd::new(
            name,
            email,
            "Via Roma 1, Milano",
            "secret",
        ))
        .await
        .unwrap()
}

async fn standard_method(engine: &Engine, admin: &Account) -> ShippingMethod {
    engine
        .create_shipping_method(admin, "Standard", Decimal::new(400, 2))
        .await
        .unwrap()
}

#[tokio::test]
async fn create_computes_cost_once_and_rate_changes_are_prospective() {
    let (engine, db) = engine_with_db().await;
    let admin = seed_admin(&db, &engine).await;
    let method = standard_method(&engine, &admin).await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;

    // 2.5 kg at 4.00 per kg.
    let package = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("Bob", "Via Po 7, Torino", Decimal::new(25, 1), method.id),
        )
        .await
        .unwrap();
    assert_eq!(package.cost, Decimal::new(1000, 2));
    assert_eq!(package.status, PackageStatus::Pending);
    assert_eq!(package.owner_id, alice.id);

    engine
        .update_shipping_rate(&admin, method.id, Decimal::new(500, 2))
        .await
        .unwrap();

    // The stored cost is untouched; only new packages price at 5.00.
    let unchanged = engine.get_package(&alice, package.id).await.unwrap();
    assert_eq!(unchanged.cost, Decimal::new(1000, 2));

    let repriced = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("Bob", "Via Po 7, Torino", Decimal::new(25, 1), method.id),
        )
        .await
        .unwrap();
    assert_eq!(repriced.cost, Decimal::new(1250, 2));
}

#[tokio::test]
async fn create_validates_weight_method_and_recipient() {
    let (engine, db) = engine_with_db().await;
    let admin = seed_admin(&db, &engine).await;
    let method = standard_method(&engine, &admin).await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;

    let zero_weight = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("Bob", "Via Po 7, Torino", Decimal::ZERO, method.id),
        )
        .await;
    assert_eq!(
        zero_weight,
        Err(EngineError::InvalidInput("weight must be > 0".to_string()))
    );

    let ghost_method = Uuid::new_v4();
    let unknown_method = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("Bob", "Via Po 7, Torino", Decimal::new(10, 1), ghost_method),
        )
        .await;
    assert_eq!(
        unknown_method,
        Err(EngineError::InvalidInput(format!(
            "unknown shipping method {ghost_method}"
        )))
    );

    let blank_recipient = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("  ", "Via Po 7, Torino", Decimal::new(10, 1), method.id),
        )
        .await;
    assert_eq!(
        blank_recipient,
        Err(EngineError::InvalidInput(
            "recipient name must not be empty".to_string()
        ))
    );
}

#[tokio::test]
async fn get_enforces_ownership_for_customers() {
    let (engine, db) = engine_with_db().await;
    let admin = seed_admin(&db, &engine).await;
    let method = standard_method(&engine, &admin).await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let eve = signup(&engine, "Eve", "eve@example.com").await;

    let package = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("Bob", "Via Po 7, Torino", Decimal::new(10, 1), method.id),
        )
        .await
        .unwrap();

    assert!(engine.get_package(&alice, package.id).await.is_ok());
    assert!(engine.get_package(&admin, package.id).await.is_ok());

    let foreign = engine.get_package(&eve, package.id).await;
    assert_eq!(
        foreign,
        Err(EngineError::Forbidden(format!(
            "package {} belongs to another account",
            package.id
        )))
    );

    let missing = engine.get_package(&alice, Uuid::new_v4()).await;
    assert_eq!(
        missing,
        Err(EngineError::KeyNotFound("package not exists".to_string()))
    );
}

#[tokio::test]
async fn list_scopes_customers_orders_newest_first_and_applies_filters() {
    let (engine, db) = engine_with_db().await;
    let admin = seed_admin(&db, &engine).await;
    let method = standard_method(&engine, &admin).await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let eve = signup(&engine, "Eve", "eve@example.com").await;

    let first = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("Bob", "Via Po 7, Torino", Decimal::new(10, 1), method.id),
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("Carla", "Corso Francia 12, Torino", Decimal::new(20, 1), method.id),
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let other = engine
        .create_package(
            &eve,
            CreatePackageCmd::new("Dora", "Via Appia 9, Roma", Decimal::new(30, 1), method.id),
        )
        .await
        .unwrap();

    // Customers only see their own, newest first.
    let mine = engine
        .list_packages(&alice, &PackageFilter::default())
        .await
        .unwrap();
    assert_eq!(
        mine.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );

    // Admins see the whole fleet.
    let fleet = engine
        .list_packages(&admin, &PackageFilter::default())
        .await
        .unwrap();
    assert_eq!(
        fleet.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![other.id, second.id, first.id]
    );

    // Search reaches the owner email, case-insensitively.
    let by_owner = engine
        .list_packages(
            &admin,
            &PackageFilter {
                search: Some("EVE@".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_owner.len(), 1);
    assert_eq!(by_owner[0].id, other.id);

    // Status and date predicates AND-compose with search.
    engine.cancel_package(&alice, first.id).await.unwrap();
    let cancelled_in_torino = engine
        .list_packages(
            &admin,
            &PackageFilter {
                status: Some(PackageStatus::Cancelled),
                search: Some("torino".to_string()),
                from: Some(first.created_at),
                to: Some(first.created_at),
            },
        )
        .await
        .unwrap();
    assert_eq!(cancelled_in_torino.len(), 1);
    assert_eq!(cancelled_in_torino[0].id, first.id);

    // A filter never widens a customer's scope.
    let probe = engine
        .list_packages(
            &eve,
            &PackageFilter {
                search: Some("alice@".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(probe.is_empty());
}

#[tokio::test]
async fn cancel_is_owner_only_and_pending_only() {
    let (engine, db) = engine_with_db().await;
    let admin = seed_admin(&db, &engine).await;
    let method = standard_method(&engine, &admin).await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let eve = signup(&engine, "Eve", "eve@example.com").await;

    let package = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("Bob", "Via Po 7, Torino", Decimal::new(10, 1), method.id),
        )
        .await
        .unwrap();

    let foreign = engine.cancel_package(&eve, package.id).await;
    assert_eq!(
        foreign,
        Err(EngineError::Forbidden(format!(
            "package {} belongs to another account",
            package.id
        )))
    );

    let cancelled = engine.cancel_package(&alice, package.id).await.unwrap();
    assert_eq!(cancelled.status, PackageStatus::Cancelled);

    let again = engine.cancel_package(&alice, package.id).await;
    assert_eq!(
        again,
        Err(EngineError::InvalidTransition(
            "cancelled -> cancelled not permitted for customer".to_string()
        ))
    );

    // Once an admin moves it past pending, the cancel window is closed.
    let second = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("Bob", "Via Po 7, Torino", Decimal::new(10, 1), method.id),
        )
        .await
        .unwrap();
    engine
        .set_package_status(&admin, second.id, PackageStatus::InTransit)
        .await
        .unwrap();
    let too_late = engine.cancel_package(&alice, second.id).await;
    assert_eq!(
        too_late,
        Err(EngineError::InvalidTransition(
            "in_transit -> cancelled not permitted for customer".to_string()
        ))
    );
}

#[tokio::test]
async fn set_status_is_admin_only_and_unconstrained_for_admins() {
    let (engine, db) = engine_with_db().await;
    let admin = seed_admin(&db, &engine).await;
    let method = standard_method(&engine, &admin).await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;

    let package = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("Bob", "Via Po 7, Torino", Decimal::new(10, 1), method.id),
        )
        .await
        .unwrap();

    let not_admin = engine
        .set_package_status(&alice, package.id, PackageStatus::InTransit)
        .await;
    assert_eq!(
        not_admin,
        Err(EngineError::Forbidden(
            "only admins may set package status".to_string()
        ))
    );

    for status in [
        PackageStatus::PickedUp,
        PackageStatus::InTransit,
        PackageStatus::OutForDelivery,
        PackageStatus::Delivered,
    ] {
        let moved = engine
            .set_package_status(&admin, package.id, status)
            .await
            .unwrap();
        assert_eq!(moved.status, status);
    }

    // Corrections go backward, even out of a terminal state.
    let corrected = engine
        .set_package_status(&admin, package.id, PackageStatus::InTransit)
        .await
        .unwrap();
    assert_eq!(corrected.status, PackageStatus::InTransit);
    assert_eq!(
        engine.get_package(&alice, package.id).await.unwrap().status,
        PackageStatus::InTransit
    );
}

#[tokio::test]
async fn concurrent_cancels_have_exactly_one_winner() {
    let (engine, db) = engine_with_db().await;
    let admin = seed_admin(&db, &engine).await;
    let method = standard_method(&engine, &admin).await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;

    let package = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("Bob", "Via Po 7, Torino", Decimal::new(10, 1), method.id),
        )
        .await
        .unwrap();

    let engine = Arc::new(engine);
    let a = {
        let engine = Arc::clone(&engine);
        let alice = alice.clone();
        tokio::spawn(async move { engine.cancel_package(&alice, package.id).await })
    };
    let b = {
        let engine = Arc::clone(&engine);
        let alice = alice.clone();
        tokio::spawn(async move { engine.cancel_package(&alice, package.id).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        loser,
        Err(EngineError::Conflict(_)) | Err(EngineError::InvalidTransition(_))
    ));

    assert_eq!(
        engine.get_package(&alice, package.id).await.unwrap().status,
        PackageStatus::Cancelled
    );
}

#[tokio::test]
async fn subscribers_get_one_event_per_commit_with_ownership_filtering() {
    let (engine, db) = engine_with_db().await;
    let admin = seed_admin(&db, &engine).await;
    let method = standard_method(&engine, &admin).await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let eve = signup(&engine, "Eve", "eve@example.com").await;

    let package = engine
        .create_package(
            &alice,
            CreatePackageCmd::new("Bob", "Via Po 7, Torino", Decimal::new(10, 1), method.id),
        )
        .await
        .unwrap();
    engine
        .set_package_status(&admin, package.id, PackageStatus::InTransit)
        .await
        .unwrap();

    let mut owner_sub = engine.subscribe_package_events(&alice);
    let mut stranger_sub = engine.subscribe_package_events(&eve);
    let mut admin_sub = engine.subscribe_package_events(&admin);

    engine
        .set_package_status(&admin, package.id, PackageStatus::Delivered)
        .await
        .unwrap();

    let event = owner_sub.try_recv().unwrap();
    assert_eq!(event.package.id, package.id);
    assert_eq!(event.package.status, PackageStatus::Delivered);
    assert!(owner_sub.try_recv().is_none());

    assert!(admin_sub.try_recv().is_some());
    assert!(stranger_sub.try_recv().is_none());

    assert_eq!(
        engine.get_package(&alice, package.id).await.unwrap().status,
        PackageStatus::Delivered
    );
}

#[tokio::test]
async fn stats_count_fleet_pending_and_recent() {
    let (engine, db) = engine_with_db().await;
    let admin = seed_admin(&db, &engine).await;
    let method = standard_method(&engine, &admin).await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;

    for _ in 0..3 {
        engine
            .create_package(
                &alice,
                CreatePackageCmd::new("Bob", "Via Po 7, Torino", Decimal::new(10, 1), method.id),
            )
            .await
            .unwrap();
    }
    let delivered = engine
        .list_packages(&alice, &PackageFilter::default())
        .await
        .unwrap()[0]
        .id;
    engine
        .set_package_status(&admin, delivered, PackageStatus::Delivered)
        .await
        .unwrap();

    let stats = engine.package_stats(&admin, Utc::now()).await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.created_last_week, 3);

    // A week from now, nothing counts as recent anymore.
    let later = engine
        .package_stats(&admin, Utc::now() + chrono::Duration::days(8))
        .await
        .unwrap();
    assert_eq!(later.created_last_week, 0);

    let not_admin = engine.package_stats(&alice, Utc::now()).await;
    assert_eq!(
        not_admin,
        Err(EngineError::Forbidden(format!(
            "account {} is not an admin",
            alice.id
        )))
    );
}
