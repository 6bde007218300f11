//! API integration tests
//!
//! Run against a live server with: cargo test -- --ignored

use chrono::Utc;
use optifield::models::UserClaims;
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";
const ROOT_URL: &str = "http://localhost:8080";

/// Token for a fresh user, signed with the server secret
fn token_for(user: Uuid) -> String {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".into());
    UserClaims {
        sub: user,
        farm_id: None,
        email: Some("tester@example.com".into()),
        exp: Utc::now().timestamp() + 3600,
    }
    .to_token(&secret)
    .expect("Failed to sign token")
}

async fn create_equipment(client: &Client, token: &str, name: &str) -> Value {
    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "name": name, "manufacturer": "John Deere", "year": 2019 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_requires_token() {
    let client = Client::new();

    let response = client
        .get(format!("{}/equipment", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_other_users_rows_are_forbidden() {
    let client = Client::new();
    let owner = token_for(Uuid::new_v4());
    let stranger = token_for(Uuid::new_v4());

    let equipment = create_equipment(&client, &owner, "Tractor").await;
    let id = equipment["id"].as_i64().expect("No id");

    let response = client
        .get(format!("{}/equipment/{}", BASE_URL, id))
        .bearer_auth(&stranger)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .get(format!("{}/equipment/{}", BASE_URL, i32::MAX))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_equipment_sorted_by_name() {
    let client = Client::new();
    let token = token_for(Uuid::new_v4());

    create_equipment(&client, &token, "B").await;
    create_equipment(&client, &token, "A").await;

    let response = client
        .get(format!("{}/equipment?sort_by=name&sort_order=asc", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Vec<Value> = response.json().await.expect("Failed to parse response");
    let names: Vec<&str> = body.iter().filter_map(|e| e["name"].as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[tokio::test]
#[ignore]
async fn test_stock_consumption_cannot_go_negative() {
    let client = Client::new();
    let token = token_for(Uuid::new_v4());

    let response = client
        .post(format!("{}/parts", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": "Oil filter", "quantity": 2, "reorder_threshold": 3 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let part: Value = response.json().await.expect("Failed to parse response");
    let id = part["id"].as_i64().expect("No id");

    let response = client
        .post(format!("{}/parts/{}/stock", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "delta": -5 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .get(format!("{}/dashboard", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let dashboard: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(dashboard["stock_alerts"][0]["percent_remaining"], 67);
}

#[tokio::test]
#[ignore]
async fn test_time_entry_lifecycle() {
    let client = Client::new();
    let token = token_for(Uuid::new_v4());

    let response = client
        .post(format!("{}/time-entries", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "task_type": "maintenance" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let entry: Value = response.json().await.expect("Failed to parse response");
    let id = entry["id"].as_str().expect("No id").to_string();

    let response = client
        .post(format!("{}/time-entries/{}/resume", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    for action in ["pause", "resume"] {
        let response = client
            .post(format!("{}/time-entries/{}/{}", BASE_URL, id, action))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["start_time"], entry["start_time"]);
    }

    let response = client
        .post(format!("{}/time-entries/{}/stop", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "notes": "done" }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "completed");
    assert!(body["duration"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_qrcode_scan_redirects() {
    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client");
    let token = token_for(Uuid::new_v4());

    let equipment = create_equipment(&client, &token, "Combine").await;
    let id = equipment["id"].as_i64().expect("No id");

    let response = client
        .post(format!("{}/equipment/{}/qrcode", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let code: Value = response.json().await.expect("Failed to parse response");
    let hash = code["qr_code_hash"].as_str().expect("No hash");

    let response = client
        .get(format!("{}/scan/{}", ROOT_URL, hash))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()["location"].to_str().unwrap(),
        format!("/equipment/{}", id)
    );

    let response = client
        .get(format!("{}/scan/{}", ROOT_URL, "0000000000000000"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_parts_lookup_never_fails() {
    let client = Client::new();
    let token = token_for(Uuid::new_v4());

    let response = client
        .post(format!("{}/parts/lookup", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "part_number": "RE504836" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["info"]["function"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_fuel_logs_newest_first_with_summary() {
    let client = Client::new();
    let token = token_for(Uuid::new_v4());
    let equipment = create_equipment(&client, &token, "Tractor").await;
    let id = equipment["id"].as_i64().expect("No id");

    for (date, liters, hours) in [("2024-05-01", 100.0, 1000.0), ("2024-05-08", 80.0, 1040.0)] {
        let response = client
            .post(format!("{}/equipment/{}/fuel-logs", BASE_URL, id))
            .bearer_auth(&token)
            .json(&json!({
                "date": date,
                "fuel_quantity_liters": liters,
                "price_per_liter": 1.5,
                "hours_at_fillup": hours
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let logs: Vec<Value> = client
        .get(format!("{}/equipment/{}/fuel-logs", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let dates: Vec<&str> = logs.iter().filter_map(|l| l["date"].as_str()).collect();
    assert_eq!(dates, vec!["2024-05-08", "2024-05-01"]);

    let summary: Value = client
        .get(format!("{}/equipment/{}/fuel-logs/summary", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(summary["total_liters"], 180.0);
    assert_eq!(summary["liters_per_hour"], 2.0);
}

#[tokio::test]
#[ignore]
async fn test_storage_location_names_are_deduplicated() {
    let client = Client::new();
    let token = token_for(Uuid::new_v4());

    let first = client
        .post(format!("{}/locations", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": "Shed A" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), StatusCode::CREATED);
    let first: Value = first.json().await.expect("Failed to parse response");

    let again = client
        .post(format!("{}/locations", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": " shed a " }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(again.status(), StatusCode::OK);
    let again: Value = again.json().await.expect("Failed to parse response");
    assert_eq!(again["id"], first["id"]);

    let all: Vec<Value> = client
        .get(format!("{}/locations", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(all.len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_parts_for_equipment() {
    let client = Client::new();
    let token = token_for(Uuid::new_v4());

    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": "Main tractor", "manufacturer": "John Deere", "model": "6155R" }))
        .send()
        .await
        .expect("Failed to send request");
    let equipment: Value = response.json().await.expect("Failed to parse response");
    let id = equipment["id"].as_i64().expect("No id");

    for (name, compatible) in [
        ("Oil filter", json!([id.to_string()])),
        ("Belt", json!(["John Deere 6155R"])),
        ("Sieve", json!(["Harvester"])),
    ] {
        let response = client
            .post(format!("{}/parts", BASE_URL))
            .bearer_auth(&token)
            .json(&json!({ "name": name, "quantity": 1, "compatible_with": compatible }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let parts: Vec<Value> = client
        .get(format!("{}/equipment/{}/parts", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let names: Vec<&str> = parts.iter().filter_map(|p| p["name"].as_str()).collect();
    assert_eq!(names, vec!["Belt", "Oil filter"]);
}
