// Interest lifecycle against a real database.
// Each test skips when DATABASE_URL is not configured.

use diesel::{Connection, ExpressionMethods, PgConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel_migrations::MigrationHarness;
use serial_test::serial;
use uuid::Uuid;

use estia_backend::db::{DieselPool, MIGRATIONS};
use estia_backend::models::lead::{PropertyLead, LEAD_STATUS_PENDING};
use estia_backend::models::property::{NewProperty, Property, STATUS_APPROVED, STATUS_PENDING};
use estia_backend::models::user::{NewUser, Role, User};
use estia_backend::services::LifecycleService;

async fn test_pool() -> Option<DieselPool> {
    dotenv::dotenv().ok();
    let url = std::env::var("DATABASE_URL").ok()?;

    let bootstrap = url.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&bootstrap).ok()?;
        conn.run_pending_migrations(MIGRATIONS).ok()?;
        Some(())
    })
    .await
    .ok()??;

    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(url);
    bb8::Pool::builder().max_size(2).build(manager).await.ok()
}

async fn seed_user(conn: &mut AsyncPgConnection, role: Role) -> User {
    let new_user = NewUser {
        email: format!("{}@test.estia.example", Uuid::new_v4().simple()),
        password_hash: "x".to_string(),
        name: "Test User".to_string(),
        role: role.as_str().to_string(),
        phone: None,
        company_name: None,
        license_number: None,
    };

    diesel::insert_into(estia_backend::schema::users::table)
        .values(&new_user)
        .get_result::<User>(conn)
        .await
        .expect("seed user")
}

async fn seed_property(conn: &mut AsyncPgConnection, owner: Uuid) -> Property {
    Property::insert(
        conn,
        &NewProperty {
            user_id: owner,
            title: format!("Listing {}", Uuid::new_v4().simple()),
            short_description: None,
            full_description: None,
            price: 250_000,
            property_type: "apartment".to_string(),
            street: None,
            street_number: None,
            city: None,
            state: None,
            bedrooms: Some(2),
            bathrooms: Some(1),
            area: Some(85),
            status: STATUS_APPROVED.to_string(),
            images: serde_json::json!([]),
        },
    )
    .await
    .expect("seed property")
}

#[tokio::test]
#[serial]
async fn new_listings_default_to_pending_status() {
    use estia_backend::schema::properties::dsl as p;

    let Some(pool) = test_pool().await else { return };

    let mut conn = pool.get().await.expect("conn");
    let seller = seed_user(&mut conn, Role::Seller).await;

    // Insert without a status so the column default applies
    let property: Property = diesel::insert_into(p::properties)
        .values((
            p::user_id.eq(seller.id),
            p::title.eq("Default-status listing"),
            p::price.eq(100_000i64),
            p::property_type.eq("apartment"),
        ))
        .get_result(&mut conn)
        .await
        .expect("insert listing");

    assert_eq!(property.status, STATUS_PENDING);
}

#[tokio::test]
#[serial]
async fn repeated_interest_reuses_the_same_lead() {
    let Some(pool) = test_pool().await else { return };

    let mut conn = pool.get().await.expect("conn");
    let seller = seed_user(&mut conn, Role::Seller).await;
    let buyer = seed_user(&mut conn, Role::Buyer).await;
    let property = seed_property(&mut conn, seller.id).await;
    drop(conn);

    let lifecycle = LifecycleService::new(pool.clone());

    let first = lifecycle
        .express_interest(buyer.id, &property)
        .await
        .expect("first interest");

    // A second submit is find-or-reuse, never an error
    let second = lifecycle
        .express_interest(buyer.id, &property)
        .await
        .expect("repeat interest");

    assert_eq!(second.lead.id, first.lead.id);
    assert_eq!(second.transaction.id, first.transaction.id);
    assert!(!second.restored);
    assert!(!second.lead.interest_cancelled);
}

#[tokio::test]
#[serial]
async fn deleting_a_listing_cascades_to_its_leads() {
    let Some(pool) = test_pool().await else { return };

    let mut conn = pool.get().await.expect("conn");
    let seller = seed_user(&mut conn, Role::Seller).await;
    let buyer = seed_user(&mut conn, Role::Buyer).await;
    let property = seed_property(&mut conn, seller.id).await;
    drop(conn);

    let lifecycle = LifecycleService::new(pool.clone());
    lifecycle
        .express_interest(buyer.id, &property)
        .await
        .expect("interest");

    let mut conn = pool.get().await.expect("conn");
    let deleted = Property::delete(&mut conn, property.id)
        .await
        .expect("delete listing");
    assert_eq!(deleted, 1);

    let lead = PropertyLead::find_latest_for_pair(&mut conn, property.id, buyer.id)
        .await
        .expect("lead query");
    assert!(lead.is_none());
}

#[tokio::test]
#[serial]
async fn cancelled_interest_is_restored_not_duplicated() {
    let Some(pool) = test_pool().await else { return };

    let mut conn = pool.get().await.expect("conn");
    let seller = seed_user(&mut conn, Role::Seller).await;
    let buyer = seed_user(&mut conn, Role::Buyer).await;
    let property = seed_property(&mut conn, seller.id).await;
    drop(conn);

    let lifecycle = LifecycleService::new(pool.clone());

    let first = lifecycle
        .express_interest(buyer.id, &property)
        .await
        .expect("interest");

    let cancelled = lifecycle
        .cancel_interest(buyer.id, property.id)
        .await
        .expect("cancel");
    assert!(cancelled.lead.interest_cancelled);

    let restored = lifecycle
        .express_interest(buyer.id, &property)
        .await
        .expect("restore");

    assert_eq!(restored.lead.id, first.lead.id);
    assert!(restored.restored);
    assert!(!restored.lead.interest_cancelled);
    assert_eq!(restored.lead.status, LEAD_STATUS_PENDING);
}
