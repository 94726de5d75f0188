use serde_json::json;

use onerecord_core::logistics::LogisticsObjectType;
use onerecord_core::models::NewInboundLogisticsObject;
use onerecord_db::SaveOutcome;

use crate::integration::common::setup_test_db;

#[tokio::test]
async fn duplicate_delivery_is_not_stored_twice() {
    let (db, _container) = setup_test_db().await;
    let repo = db.inbound_repo();

    let doc = json!({
        "@id": "https://publisher.example/companies/acme/los/1",
        "@type": "Airwaybill"
    });
    let delivery = NewInboundLogisticsObject::from_document(doc).unwrap();

    let first = repo.save(&delivery).await.unwrap();
    let SaveOutcome::Created(first) = first else {
        panic!("first delivery should be created");
    };

    let second = repo.save(&delivery).await.unwrap();
    let SaveOutcome::Duplicate(second) = second else {
        panic!("second delivery should be a duplicate");
    };
    assert_eq!(first.id, second.id);

    assert_eq!(repo.list(None, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn changed_document_is_stored() {
    let (db, _container) = setup_test_db().await;
    let repo = db.inbound_repo();

    let v1 = json!({"@id": "https://publisher.example/los/1", "@type": "Booking", "pieces": 1});
    let v2 = json!({"@id": "https://publisher.example/los/1", "@type": "Booking", "pieces": 2});

    repo.save(&NewInboundLogisticsObject::from_document(v1).unwrap())
        .await
        .unwrap();
    let outcome = repo
        .save(&NewInboundLogisticsObject::from_document(v2).unwrap())
        .await
        .unwrap();
    assert!(matches!(outcome, SaveOutcome::Created(_)));

    let received = repo.list(Some(LogisticsObjectType::Booking), 10).await.unwrap();
    assert_eq!(received.len(), 2);
    assert!(repo.list(Some(LogisticsObjectType::Airwaybill), 10).await.unwrap().is_empty());

    let fetched = repo.get(received[0].id).await.unwrap().unwrap();
    assert_eq!(fetched.topic, LogisticsObjectType::Booking);
}
