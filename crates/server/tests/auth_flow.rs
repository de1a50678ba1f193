mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{json_request, register_user, send, try_app};

#[tokio::test]
async fn register_login_and_profile_flow() -> anyhow::Result<()> {
    let Some((app, _db)) = try_app().await else { return Ok(()) };

    let email = format!("user_{}@example.com", Uuid::new_v4());
    let (token, user_id) = register_user(&app, &email).await;

    // Login again with the same credentials.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(&json!({ "email": email, "password": "hunter22" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], email.as_str());
    // Password material never appears in responses.
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());

    // Profile reflects the token's subject.
    let (status, body) =
        send(&app, json_request("GET", "/api/auth/profile", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id.to_string());
    assert_eq!(body["role"], "USER");
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_rejected() -> anyhow::Result<()> {
    let Some((app, _db)) = try_app().await else { return Ok(()) };

    let email = format!("dup_{}@example.com", Uuid::new_v4());
    register_user(&app, &email).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            Some(&json!({ "email": email, "password": "hunter22" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "got: {body}");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> anyhow::Result<()> {
    let Some((app, _db)) = try_app().await else { return Ok(()) };

    let email = format!("wrong_{}@example.com", Uuid::new_v4());
    register_user(&app, &email).await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(&json!({ "email": email, "password": "not-it" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_token() -> anyhow::Result<()> {
    let Some((app, _db)) = try_app().await else { return Ok(()) };

    let (status, _) = send(&app, json_request("GET", "/api/clients", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        send(&app, json_request("GET", "/api/clients", Some("not-a-jwt"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Health stays public.
    let (status, body) = send(&app, json_request("GET", "/api/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    Ok(())
}

#[tokio::test]
async fn provider_mutations_are_admin_only() -> anyhow::Result<()> {
    let Some((app, _db)) = try_app().await else { return Ok(()) };

    let email = format!("plain_{}@example.com", Uuid::new_v4());
    let (token, _) = register_user(&app, &email).await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/providers",
            Some(&token),
            Some(&json!({ "name": format!("p_{}", Uuid::new_v4()) })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Reading the registry is open to any authenticated user.
    let (status, _) = send(&app, json_request("GET", "/api/providers", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn change_password_rotates_the_credential() -> anyhow::Result<()> {
    let Some((app, _db)) = try_app().await else { return Ok(()) };

    let email = format!("rotate_{}@example.com", Uuid::new_v4());
    let (token, _) = register_user(&app, &email).await;

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/auth/change-password",
            Some(&token),
            Some(&json!({
                "currentPassword": "hunter22",
                "newPassword": "different7",
                "confirmPassword": "different7"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(&json!({ "email": email, "password": "hunter22" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(&json!({ "email": email, "password": "different7" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
