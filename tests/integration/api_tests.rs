//! API integration tests against a running server with a seeded librarian account

use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";

fn credentials() -> (String, String) {
    (
        std::env::var("LOCALLIBRARY_TEST_USERNAME").unwrap_or_else(|_| "librarian".to_string()),
        std::env::var("LOCALLIBRARY_TEST_PASSWORD").unwrap_or_else(|_| "librarian".to_string()),
    )
}

/// Client that reports redirects instead of following them
fn client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .cookie_store(true)
        .build()
        .expect("Failed to build client")
}

/// Helper to get a bearer token for the seeded librarian
async fn get_auth_token(client: &Client) -> String {
    let (username, password) = credentials();
    let response = client
        .post(format!("{}/accounts/login", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let response = client()
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
async fn test_login_invalid_credentials() {
    let response = client()
        .post(format!("{}/accounts/login", BASE_URL))
        .json(&json!({ "username": "librarian", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_home_counts_visits() {
    let client = client();
    let mut visits = Vec::new();

    for _ in 0..3 {
        let body: Value = client
            .get(format!("{}/catalog", BASE_URL))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response");
        visits.push(body["num_visits"].as_i64().expect("num_visits missing"));
    }

    assert_eq!(visits, vec![1, 2, 3]);
}

#[tokio::test]
#[ignore]
async fn test_my_books_requires_login() {
    let response = client()
        .get(format!("{}/catalog/mybooks", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()["location"],
        "/accounts/login?next=/catalog/mybooks"
    );
}

#[tokio::test]
#[ignore]
async fn test_author_lifecycle() {
    let client = client();
    let token = get_auth_token(&client).await;

    // Create
    let response = client
        .post(format!("{}/catalog/author/create", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "first_name": "Jane", "last_name": "Doe" }))
        .send()
        .await
        .expect("Failed to create author");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let detail_url = response.headers()["location"]
        .to_str()
        .expect("Invalid location")
        .to_string();

    // Update the date of death
    let response = client
        .post(format!("{}{}/update", BASE_URL, detail_url))
        .bearer_auth(&token)
        .json(&json!({ "first_name": "Jane", "last_name": "Doe", "date_of_death": "2020-11-06" }))
        .send()
        .await
        .expect("Failed to update author");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body: Value = client
        .get(format!("{}{}", BASE_URL, detail_url))
        .send()
        .await
        .expect("Failed to fetch author")
        .json()
        .await
        .expect("Failed to parse author");
    assert_eq!(body["date_of_death"], "2020-11-06");

    // Delete
    let response = client
        .post(format!("{}{}/delete", BASE_URL, detail_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete author");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/catalog/authors");

    let response = client
        .get(format!("{}{}", BASE_URL, detail_url))
        .send()
        .await
        .expect("Failed to fetch author");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_borrowed_forbidden_for_anonymous() {
    let response = client()
        .get(format!("{}/catalog/borrowed", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
