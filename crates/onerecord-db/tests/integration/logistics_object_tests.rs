use serde_json::json;
use uuid::Uuid;

use onerecord_core::logistics::LogisticsObjectType;
use onerecord_core::models::{NewCompany, NewLogisticsObject};
use onerecord_db::Database;

use crate::integration::common::setup_test_db;

async fn seed_company(db: &Database, id: &str) {
    db.company_repo()
        .create(&NewCompany {
            company_id: id.to_string(),
            company_name: id.to_string(),
            company_pin_hash: "hash".to_string(),
        })
        .await
        .unwrap();
}

fn new_lo(company_id: &str, lo_type: LogisticsObjectType) -> NewLogisticsObject {
    NewLogisticsObject {
        id: Uuid::new_v4(),
        company_id: company_id.to_string(),
        lo_type,
        document: json!({"@type": lo_type.as_str()}),
    }
}

#[tokio::test]
async fn create_and_get_logistics_object() {
    let (db, _container) = setup_test_db().await;
    seed_company(&db, "acme").await;
    let repo = db.logistics_object_repo();

    let new = new_lo("acme", LogisticsObjectType::Airwaybill);
    let created = repo.create(&new).await.unwrap();
    assert_eq!(created.id, new.id);
    assert_eq!(created.lo_type, LogisticsObjectType::Airwaybill);

    let fetched = repo.get("acme", new.id).await.unwrap().unwrap();
    assert_eq!(fetched.document, new.document);

    // Scoped by company
    seed_company(&db, "globex").await;
    assert!(repo.get("globex", new.id).await.unwrap().is_none());
}

#[tokio::test]
async fn list_filters_by_type() {
    let (db, _container) = setup_test_db().await;
    seed_company(&db, "acme").await;
    let repo = db.logistics_object_repo();

    repo.create(&new_lo("acme", LogisticsObjectType::Airwaybill))
        .await
        .unwrap();
    repo.create(&new_lo("acme", LogisticsObjectType::Booking))
        .await
        .unwrap();
    repo.create(&new_lo("acme", LogisticsObjectType::Booking))
        .await
        .unwrap();

    assert_eq!(repo.list("acme", None, 10).await.unwrap().len(), 3);

    let bookings = repo
        .list("acme", Some(LogisticsObjectType::Booking), 10)
        .await
        .unwrap();
    assert_eq!(bookings.len(), 2);
    assert!(
        bookings
            .iter()
            .all(|lo| lo.lo_type == LogisticsObjectType::Booking)
    );
}

#[tokio::test]
async fn replace_updates_document() {
    let (db, _container) = setup_test_db().await;
    seed_company(&db, "acme").await;
    let repo = db.logistics_object_repo();

    let new = new_lo("acme", LogisticsObjectType::Housewaybill);
    repo.create(&new).await.unwrap();

    let document = json!({"@type": "Housewaybill", "houseWaybillNumber": "HWB-1"});
    let replaced = repo
        .replace("acme", new.id, &document)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(replaced.document, document);
    assert!(replaced.updated_at >= replaced.created_at);

    let missing = repo
        .replace("acme", Uuid::new_v4(), &document)
        .await
        .unwrap();
    assert!(missing.is_none());
}
