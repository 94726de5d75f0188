use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use crate::integration::common::{
    TEST_SERVER_SECRET, TEST_SUBSCRIPTION_SECRET, form_request, json_request, send,
    setup_test_app,
};

const PUBLIC_URL: &str = "http://localhost:3000";

fn authorized(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

/// Create company `acme` with user `alice` and return alice's token.
async fn register_and_login(app: &Router) -> String {
    let company = json!({"companyId": "acme", "companyName": "Acme Cargo", "companyPin": "4321"});
    let (status, _, _) = send(app, json_request("POST", "/companies", &company)).await;
    assert_eq!(status, StatusCode::CREATED);

    let user = json!({"username": "alice", "password": "pa55word", "companyPin": "4321"});
    let (status, _, _) = send(app, json_request("POST", "/companies/acme/users", &user)).await;
    assert_eq!(status, StatusCode::CREATED);

    let login = json!({"username": "alice", "password": "pa55word"});
    let (status, _, json) =
        send(app, json_request("POST", "/companies/acme/users/login", &login)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tokenType"], "Bearer");
    json["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_returns_200() {
    let (app, _container) = setup_test_app().await;

    let (status, _, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn company_and_user_lifecycle() {
    let (app, _container) = setup_test_app().await;

    let company = json!({"companyId": "acme", "companyName": "Acme Cargo", "companyPin": "4321"});
    let (status, _, json) = send(&app, json_request("POST", "/companies", &company)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["companyId"], "acme");
    assert!(json.get("companyPin").is_none());
    assert!(json.get("companyPinHash").is_none());

    let (status, _, json) = send(&app, json_request("POST", "/companies", &company)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");

    let wrong_pin = json!({"username": "alice", "password": "pa55word", "companyPin": "0000"});
    let (status, _, _) = send(&app, json_request("POST", "/companies/acme/users", &wrong_pin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let unknown = json!({"username": "alice", "password": "pa55word", "companyPin": "4321"});
    let (status, _, _) = send(&app, json_request("POST", "/companies/globex/users", &unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let user = json!({"username": "alice", "password": "pa55word", "companyPin": "4321"});
    let (status, _, json) = send(&app, json_request("POST", "/companies/acme/users", &user)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["username"], "alice");
    assert!(json.get("password").is_none());

    let (status, _, _) = send(&app, json_request("POST", "/companies/acme/users", &user)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let bad_login = json!({"username": "alice", "password": "nope"});
    let (status, _, wrong_password) =
        send(&app, json_request("POST", "/companies/acme/users/login", &bad_login)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // An unknown user is indistinguishable from a wrong password
    let ghost = json!({"username": "mallory", "password": "nope"});
    let (status, _, unknown_user) =
        send(&app, json_request("POST", "/companies/acme/users/login", &ghost)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user, wrong_password);

    let (status, _, json) = send(
        &app,
        form_request(
            "POST",
            "/companies/acme/users/login",
            "username=alice&password=pa55word",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tokenType"], "Bearer");

    let login = json!({"username": "alice", "password": "pa55word"});
    let (status, _, json) =
        send(&app, json_request("POST", "/companies/acme/users/login", &login)).await;
    assert_eq!(status, StatusCode::OK);
    let token = json["token"].as_str().unwrap().to_string();
    assert!(json["expiresAt"].is_string());

    let (status, _, json) = send(&app, authorized(get("/companies/acme"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["companyName"], "Acme Cargo");

    let (status, _, json) = send(&app, authorized(get("/companies/acme/users"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);

    let (status, _, json) = send(&app, authorized(get("/companies"), TEST_SERVER_SECRET)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    assert_eq!(json["companies"][0]["companyId"], "acme");
}

#[tokio::test]
async fn logistics_object_lifecycle() {
    let (app, _container) = setup_test_app().await;
    let token = register_and_login(&app).await;

    let booking = json!({"@type": "Booking", "bookingNumber": "B-001"});
    let (status, headers, created) = send(
        &app,
        authorized(json_request("POST", "/companies/acme/los", &booking), &token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let location = headers[header::LOCATION].to_str().unwrap().to_string();
    assert!(location.starts_with(&format!("{PUBLIC_URL}/companies/acme/los/")));
    assert_eq!(created["@id"], location.as_str());
    assert_eq!(created["bookingNumber"], "B-001");

    // Fetching by @id needs no token
    let path = location.trim_start_matches(PUBLIC_URL).to_string();
    let (status, _, fetched) = send(&app, get(&path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, _, json) = send(
        &app,
        authorized(get("/companies/acme/los?type=Booking"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);

    let (status, _, json) = send(
        &app,
        authorized(get("/companies/acme/los?type=Airwaybill"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 0);

    let (status, _, _) = send(
        &app,
        authorized(get("/companies/acme/los?type=Pallet"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let retyped = json!({"@type": "Airwaybill"});
    let (status, _, _) = send(
        &app,
        authorized(json_request("PUT", &path, &retyped), &token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let updated = json!({"@type": "Booking", "bookingNumber": "B-002"});
    let (status, _, json) = send(
        &app,
        authorized(json_request("PUT", &path, &updated), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["bookingNumber"], "B-002");
    assert_eq!(json["@id"], location.as_str());

    let (status, _, _) = send(
        &app,
        get("/companies/acme/los/00000000-0000-0000-0000-000000000000"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn published_objects_are_received_once() {
    let (app, _container) = setup_test_app().await;
    let token = register_and_login(&app).await;

    let document = json!({
        "@id": "https://publisher.example/companies/globex/los/7",
        "@type": "https://onerecord.iata.org/ns/cargo#Airwaybill",
        "waybillNumber": "020-12345675"
    });

    let deliver = || {
        let mut request = json_request("POST", "/callbackUrl", &document);
        request.headers_mut().insert(
            "x-subscription-secret",
            TEST_SUBSCRIPTION_SECRET.parse().unwrap(),
        );
        request
    };

    let (status, _, first) = send(&app, deliver()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["topic"], "Airwaybill");
    assert_eq!(first["duplicate"], false);

    let (status, _, second) = send(&app, deliver()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["duplicate"], true);
    assert_eq!(second["id"], first["id"]);

    let (status, _, json) = send(&app, authorized(get("/losFromPublishers"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    assert_eq!(
        json["logisticsObjects"][0]["publisherId"],
        "https://publisher.example/companies/globex/los/7"
    );

    let (status, _, json) = send(
        &app,
        authorized(get("/losFromPublishers?topic=Booking"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 0);

    let id = first["id"].as_str().unwrap();
    let (status, _, json) = send(
        &app,
        authorized(get(&format!("/losFromPublishers/{id}")), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["document"]["waybillNumber"], "020-12345675");
}
