//! HTTP surface integration tests

use axum::http::{Method, StatusCode, header};
use mohali_db::UserRole;
use serde_json::json;

mod common;
use common::{TestApp, bearer};

#[tokio::test]
async fn test_register_login_contact_profile_flow() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Method::POST,
            "/api/auth/register",
            &[],
            Some(json!({"name": "Asha", "email": "Asha@Example.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "asha@example.com");
    assert_eq!(body["user"]["role"], "customer");
    assert!(body["user"].get("password_hash").is_none());

    let response = app
        .send(
            Method::POST,
            "/api/auth/login",
            &[],
            Some(json!({"email": "asha@example.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["expires_in"], 3600);
    assert!(
        response
            .header(header::SET_COOKIE)
            .unwrap()
            .starts_with(&format!("token={};", token))
    );

    let auth = bearer(&token);
    let response = app
        .send(
            Method::POST,
            "/api/contact",
            &[(header::AUTHORIZATION, auth.as_str())],
            Some(json!({
                "name": "Asha",
                "email": "asha@example.com",
                "subject": "Booking",
                "message": "Is Saturday free?"
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["message"], "Contact form submitted successfully.");
    let contact_id = body["id"].as_str().unwrap().to_string();

    let stored = app.db.get_contact(&contact_id).await.unwrap().unwrap();
    assert!(stored.user_id.is_some());

    let response = app
        .send(
            Method::GET,
            "/api/user/profile",
            &[(header::AUTHORIZATION, auth.as_str())],
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["user"]["name"], "Asha");
    assert!(body["user"]["createdAt"].is_string());
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new().await;

    let cases = [
        (json!({"email": "a@b.co", "password": "secret1"}), "Name, email and password are required"),
        (json!({"name": "A", "email": "not-an-email", "password": "secret1"}), "Invalid email format"),
        (json!({"name": "A", "email": "a@b.co", "password": "12345"}), "Password must be at least 6 characters"),
        (json!({"name": "A", "email": "a@b.co"}), "Password must be at least 6 characters"),
    ];

    for (payload, message) in cases {
        let response = app.send(Method::POST, "/api/auth/register", &[], Some(payload)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.json()["error"], message);
    }
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    app.create_user("ravi@example.com", "secret1", UserRole::Customer).await;

    let response = app
        .send(
            Method::POST,
            "/api/auth/register",
            &[],
            Some(json!({"name": "Ravi", "email": "RAVI@example.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.json()["error"], "User with this email already exists");
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new().await;
    app.create_user("ravi@example.com", "secret1", UserRole::Customer).await;

    let response = app
        .send(Method::POST, "/api/auth/login", &[], Some(json!({"email": "ravi@example.com"})))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    for payload in [
        json!({"email": "ravi@example.com", "password": "wrong-password"}),
        json!({"email": "nobody@example.com", "password": "secret1"}),
    ] {
        let response = app.send(Method::POST, "/api/auth/login", &[], Some(payload)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.json()["error"], "Invalid email or password");
        assert!(response.header(header::SET_COOKIE).is_none());
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .send(Method::POST, "/api/auth/login", &[], Some(json!("just a string")))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["success"], false);
}

#[tokio::test]
async fn test_contact_requires_credential() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Method::POST,
            "/api/contact",
            &[],
            Some(json!({"name": "A", "email": "a@b.co", "subject": "s", "message": "m"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "Authentication required. Please log in.");

    let response = app
        .send(
            Method::POST,
            "/api/contact",
            &[(header::AUTHORIZATION, "Bearer forged.token.value")],
            Some(json!({"name": "A", "email": "a@b.co", "subject": "s", "message": "m"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "Session expired. Please log in again.");
}

#[tokio::test]
async fn test_contact_validation() {
    let app = TestApp::new().await;
    let user = app.create_user("ravi@example.com", "secret1", UserRole::Customer).await;
    let auth = bearer(&app.token_for(&user));

    let response = app
        .send(
            Method::POST,
            "/api/contact",
            &[(header::AUTHORIZATION, auth.as_str())],
            Some(json!({"name": "Ravi", "email": "ravi@example.com", "subject": "  "})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "All fields are required.");

    let response = app
        .send(
            Method::POST,
            "/api/contact",
            &[(header::AUTHORIZATION, auth.as_str())],
            Some(json!({"name": "Ravi", "email": "ravi@mohali", "subject": "s", "message": "m"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Invalid email address.");
}

#[tokio::test]
async fn test_contact_listing_is_admin_only() {
    let app = TestApp::new().await;
    let customer = app.create_user("ravi@example.com", "secret1", UserRole::Customer).await;
    let admin = app.create_user("owner@example.com", "secret1", UserRole::Admin).await;
    let customer_auth = bearer(&app.token_for(&customer));
    let admin_auth = bearer(&app.token_for(&admin));

    for subject in ["first", "second"] {
        let response = app
            .send(
                Method::POST,
                "/api/contact",
                &[(header::AUTHORIZATION, customer_auth.as_str())],
                Some(json!({"name": "Ravi", "email": "ravi@example.com", "subject": subject, "message": "m"})),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let response = app
        .send(Method::GET, "/api/contact", &[(header::AUTHORIZATION, customer_auth.as_str())], None)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .send(Method::GET, "/api/contact", &[(header::AUTHORIZATION, admin_auth.as_str())], None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["subject"], "second");
    assert_eq!(data[0]["status"], "unread");

    let id = data[0]["id"].as_str().unwrap();
    let uri = format!("/api/contact/{}", id);

    let response = app
        .send(
            Method::PATCH,
            &uri,
            &[(header::AUTHORIZATION, customer_auth.as_str())],
            Some(json!({"status": "read"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .send(
            Method::PATCH,
            &uri,
            &[(header::AUTHORIZATION, admin_auth.as_str())],
            Some(json!({"status": "replied"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"]["status"], "replied");

    let response = app
        .send(
            Method::PATCH,
            &uri,
            &[(header::AUTHORIZATION, admin_auth.as_str())],
            Some(json!({"status": "archived"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .send(
            Method::PATCH,
            "/api/contact/missing",
            &[(header::AUTHORIZATION, admin_auth.as_str())],
            Some(json!({"status": "read"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_errors() {
    let app = TestApp::new().await;

    let response = app.send(Method::GET, "/api/user/profile", &[], None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "No token provided");

    let response = app
        .send(
            Method::GET,
            "/api/user/profile",
            &[(header::AUTHORIZATION, "Bearer nope")],
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "Invalid or expired token");

    // Well-formed token for an account that does not exist
    let token = app
        .jwt
        .generate_token("ghost", "ghost@example.com", UserRole::Customer)
        .unwrap();
    let auth = bearer(&token);
    let response = app
        .send(Method::GET, "/api/user/profile", &[(header::AUTHORIZATION, auth.as_str())], None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "User not found");
}

#[tokio::test]
async fn test_protected_page_redirects_then_admits_session_cookie() {
    let app = TestApp::new().await;

    let response = app.send(Method::GET, "/tattoo/booking", &[], None).await;
    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header(header::LOCATION),
        Some("/auth?redirect=/tattoo/booking")
    );

    let response = app
        .send(Method::GET, "/art/booking", &[(header::COOKIE, "token=stale")], None)
        .await;
    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert!(response.header(header::SET_COOKIE).unwrap().contains("Max-Age=0"));

    let user = app.create_user("ravi@example.com", "secret1", UserRole::Client).await;
    let cookie = format!("token={}", app.token_for(&user));
    let response = app
        .send(Method::GET, "/tattoo/booking", &[(header::COOKIE, cookie.as_str())], None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("Book a tattoo session"));
}

#[tokio::test]
async fn test_protected_page_unreachable_through_path_variants() {
    let app = TestApp::new().await;

    for path in [
        "//tattoo/booking",
        "/./tattoo/booking",
        "/tattoo//booking",
        "/tattoo/booking//",
        "/art/../tattoo/booking",
        "//art/booking",
    ] {
        let response = app.send(Method::GET, path, &[], None).await;
        assert_ne!(response.status, StatusCode::OK, "{path}");
        assert!(!response.text.contains("Book a tattoo session"), "{path}");
        assert!(!response.text.contains("Commission an artwork"), "{path}");
    }

    // Canonical trailing slash still goes through the gatekeeper
    let response = app.send(Method::GET, "/tattoo/booking/", &[], None).await;
    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_open_pages_and_health() {
    let app = TestApp::new().await;

    let response = app.send(Method::GET, "/", &[], None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.send(Method::GET, "/contact", &[], None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.send(Method::GET, "/nowhere", &[], None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.text.contains("Page not found"));

    let response = app.send(Method::GET, "/health", &[], None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "healthy");

    let response = app.send(Method::GET, "/api/test-db", &[], None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["success"], true);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;

    let response = app.send(Method::POST, "/api/auth/logout", &[], None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .header(header::SET_COOKIE)
            .unwrap()
            .starts_with("token=;")
    );
}
