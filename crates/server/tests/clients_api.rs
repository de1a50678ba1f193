mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use common::{admin_token, json_request, send, try_app};

#[tokio::test]
async fn client_crud_over_http() -> anyhow::Result<()> {
    let Some((app, db)) = try_app().await else { return Ok(()) };

    let token = admin_token(&app, &db, &format!("crud_{}@example.com", Uuid::new_v4())).await;

    // Admin can create a provider.
    let provider_name = format!("prov_{}", Uuid::new_v4());
    let (status, provider) = send(
        &app,
        json_request("POST", "/api/providers", Some(&token), Some(&json!({ "name": provider_name }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "provider create: {provider}");
    let provider_id = provider["id"].as_str().expect("provider id").to_string();

    // Create a client under it.
    let email = format!("client_{}@example.com", Uuid::new_v4());
    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/clients",
            Some(&token),
            Some(&json!({
                "name": "Jane Doe",
                "email": email,
                "providerId": provider_id,
                "price": 120.5,
                "status": "active",
                "city": "Lisbon"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "client create: {created}");
    let client_id = created["id"].as_str().expect("client id").to_string();
    assert_eq!(created["provider"]["name"], provider_name.as_str());

    // Duplicate email is a 400, not a 409.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/clients",
            Some(&token),
            Some(&json!({ "name": "Copy", "email": email, "providerId": provider_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // List filtered to this provider.
    let (status, page) = send(
        &app,
        json_request(
            "GET",
            &format!("/api/clients?providerId={provider_id}&search=jane"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["clients"][0]["id"], client_id.as_str());

    // Patch a couple of fields.
    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/clients/{client_id}"),
            Some(&token),
            Some(&json!({ "status": "inactive", "price": 99.0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "INACTIVE");
    assert_eq!(updated["name"], "Jane Doe");

    // Provider delete is blocked while the client exists.
    let (status, _) = send(
        &app,
        json_request("DELETE", &format!("/api/providers/{provider_id}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Delete the client, then the provider goes through.
    let (status, _) = send(
        &app,
        json_request("DELETE", &format!("/api/clients/{client_id}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        json_request("DELETE", &format!("/api/providers/{provider_id}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        json_request("GET", &format!("/api/clients/{client_id}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn export_streams_an_attachment() -> anyhow::Result<()> {
    let Some((app, db)) = try_app().await else { return Ok(()) };

    let token = admin_token(&app, &db, &format!("exp_{}@example.com", Uuid::new_v4())).await;
    let provider_name = format!("expprov_{}", Uuid::new_v4());
    let (_, provider) = send(
        &app,
        json_request("POST", "/api/providers", Some(&token), Some(&json!({ "name": provider_name }))),
    )
    .await;
    let provider_id = provider["id"].as_str().expect("provider id").to_string();
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/clients",
            Some(&token),
            Some(&json!({
                "name": "Export Target",
                "email": format!("exp_{}@example.com", Uuid::new_v4()),
                "providerId": provider_id
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/export?format=csv&fields=name,email&providerId={provider_id}"))
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "text/csv");
    let disposition = resp.headers()["content-disposition"].to_str()?.to_string();
    assert!(disposition.starts_with("attachment; filename=\"clients_"));
    assert!(disposition.ends_with(".csv\""));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let text = String::from_utf8(bytes.to_vec())?;
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Name,Email"));
    assert!(lines.next().unwrap_or_default().starts_with("Export Target,"));

    // Cleanup.
    let (_, page) = send(
        &app,
        json_request("GET", &format!("/api/clients?providerId={provider_id}"), Some(&token), None),
    )
    .await;
    let ids: Vec<&str> =
        page["clients"].as_array().unwrap().iter().filter_map(|c| c["id"].as_str()).collect();
    let (status, deleted) = send(
        &app,
        json_request("POST", "/api/clients/delete-multiple", Some(&token), Some(&json!({ "ids": ids }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["count"], 1);
    send(&app, json_request("DELETE", &format!("/api/providers/{provider_id}"), Some(&token), None))
        .await;
    Ok(())
}

#[tokio::test]
async fn import_accepts_a_multipart_csv() -> anyhow::Result<()> {
    let Some((app, db)) = try_app().await else { return Ok(()) };

    let token = admin_token(&app, &db, &format!("imp_{}@example.com", Uuid::new_v4())).await;
    let provider_name = format!("impprov_{}", Uuid::new_v4());
    let good = format!("row_{}@example.com", Uuid::new_v4());
    let csv = format!(
        "name,email,provider,price\nImported One,{good},{provider_name},42\nBad Row,,{provider_name},1\n"
    );

    let boundary = "testboundary";
    let body = format!(
        "--{boundary}\r\ncontent-disposition: form-data; name=\"file\"; filename=\"clients.csv\"\r\ncontent-type: text/csv\r\n\r\n{csv}\r\n--{boundary}--\r\n"
    );
    let req = Request::builder()
        .method("POST")
        .uri("/api/import")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let report: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(report["success"], 1, "report: {report}");
    assert_eq!(report["total"], 2);
    assert_eq!(report["errors"][0]["row"], 3);

    // The provider named in the file was created on the fly.
    let (_, providers) = send(&app, json_request("GET", "/api/providers", Some(&token), None)).await;
    let created = providers
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == provider_name.as_str())
        .cloned()
        .expect("imported provider");
    assert_eq!(created["clientCount"], 1);

    // Cleanup.
    let provider_id = created["id"].as_str().unwrap().to_string();
    let (_, page) = send(
        &app,
        json_request("GET", &format!("/api/clients?providerId={provider_id}"), Some(&token), None),
    )
    .await;
    let ids: Vec<&str> =
        page["clients"].as_array().unwrap().iter().filter_map(|c| c["id"].as_str()).collect();
    send(&app, json_request("POST", "/api/clients/delete-multiple", Some(&token), Some(&json!({ "ids": ids }))))
        .await;
    send(&app, json_request("DELETE", &format!("/api/providers/{provider_id}"), Some(&token), None))
        .await;
    Ok(())
}
