//! Integration tests for upload, check, list, and restore.

mod helpers;

use http::{StatusCode, header};

use helpers::{TestApp, sha256_hex};

fn versions(listing: &serde_json::Value, file: &str) -> Vec<String> {
    listing["files"][file]
        .as_array()
        .map(|vs| vs.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_backup_round_trip() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;

    let response = app
        .upload(Some(&token), Some("alice"), "notes.txt", b"first draft")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "uploaded");
    let version = response.json()["version"].as_str().unwrap().to_string();

    let listing = app.get("/api/list", Some(&token), None).await.json();
    assert_eq!(versions(&listing, "notes.txt"), vec![version.clone()]);

    let hash = sha256_hex(b"first draft");
    let check = app
        .post(
            &format!("/api/check?filename=notes.txt&filehash={hash}"),
            Some(&token),
        )
        .await;
    assert_eq!(check.status, StatusCode::OK);
    assert_eq!(check.json()["exists"], true);

    let restored = app
        .post("/api/restore?filename=notes.txt", Some(&token))
        .await;
    assert_eq!(restored.status, StatusCode::OK);
    assert_eq!(restored.body, b"first draft");
    assert_eq!(restored.header("x-version"), Some(version.as_str()));
    assert_eq!(
        restored.header(header::CONTENT_DISPOSITION.as_str()),
        Some("attachment; filename=\"notes.txt\"")
    );
}

#[tokio::test]
async fn test_duplicate_upload_stores_nothing() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;

    app.upload(Some(&token), Some("alice"), "a.txt", b"same").await;
    app.upload(Some(&token), Some("alice"), "a.txt", b"other").await;
    let response = app.upload(Some(&token), Some("alice"), "a.txt", b"same").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "duplicate");

    let listing = app.get("/api/list", Some(&token), None).await.json();
    assert_eq!(versions(&listing, "a.txt").len(), 2);
}

#[tokio::test]
async fn test_retention_keeps_newest_four() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;

    let mut stored = Vec::new();
    for i in 0..6 {
        let response = app
            .upload(
                Some(&token),
                Some("alice"),
                "report.doc",
                format!("revision {i}").as_bytes(),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        stored.push(response.json()["version"].as_str().unwrap().to_string());
    }

    let listing = app.get("/api/list", Some(&token), None).await.json();
    assert_eq!(versions(&listing, "report.doc"), stored[2..].to_vec());

    // Evicted content is gone.
    let evicted = app
        .post(
            &format!("/api/restore?filename=report.doc&version={}", stored[0]),
            Some(&token),
        )
        .await;
    assert_eq!(evicted.status, StatusCode::NOT_FOUND);

    let hash = sha256_hex(b"revision 0");
    let check = app
        .post(
            &format!("/api/check?filename=report.doc&filehash={hash}"),
            Some(&token),
        )
        .await;
    assert_eq!(check.json()["exists"], false);

    let oldest_kept = app
        .post(
            &format!("/api/restore?filename=report.doc&version={}", stored[2]),
            Some(&token),
        )
        .await;
    assert_eq!(oldest_kept.body, b"revision 2");

    let latest = app
        .post("/api/restore?filename=report.doc", Some(&token))
        .await;
    assert_eq!(latest.body, b"revision 5");
}

#[tokio::test]
async fn test_unauthorized_upload_changes_nothing() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;

    let response = app
        .upload(Some("not-a-token"), Some("alice"), "a.txt", b"x")
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.upload(None, Some("alice"), "a.txt", b"x").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let listing = app.get("/api/list", Some(&token), None).await.json();
    assert!(listing["files"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_as_other_user_is_forbidden() {
    let app = TestApp::new().await;
    let alice = app.login("alice").await;
    let bob = app.login("bob").await;

    let response = app.upload(Some(&alice), Some("bob"), "a.txt", b"x").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.json()["error"], "FORBIDDEN");

    let listing = app.get("/api/list", Some(&bob), None).await.json();
    assert!(listing["files"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_without_username_header_is_rejected() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;

    let response = app.upload(Some(&token), None, "a.txt", b"x").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blacklisted_filename_is_rejected() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;

    for name in ["System32", "..", "/etc/passwd"] {
        let response = app.upload(Some(&token), Some("alice"), name, b"x").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "accepted {name}");
        assert_eq!(response.json()["error"], "UNSAFE_PATH");
    }

    let listing = app.get("/api/list", Some(&token), None).await.json();
    assert!(listing["files"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_client_path_is_reduced_to_base_name() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;

    let response = app
        .upload(Some(&token), Some("alice"), "docs/2024/plan.txt", b"plan")
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let listing = app.get("/api/list", Some(&token), None).await.json();
    assert_eq!(versions(&listing, "plan.txt").len(), 1);
}

#[tokio::test]
async fn test_users_do_not_see_each_other() {
    let app = TestApp::new().await;
    let alice = app.login("alice").await;
    let bob = app.login("bob").await;

    app.upload(Some(&alice), Some("alice"), "secret.txt", b"alice only")
        .await;

    let listing = app.get("/api/list", Some(&bob), None).await.json();
    assert!(listing["files"].as_object().unwrap().is_empty());

    let restore = app
        .post("/api/restore?filename=secret.txt", Some(&bob))
        .await;
    assert_eq!(restore.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_restore_unknown_file_or_version() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;
    app.upload(Some(&token), Some("alice"), "a.txt", b"x").await;

    let missing = app.post("/api/restore?filename=b.txt", Some(&token)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let bad_version = app
        .post("/api/restore?filename=a.txt&version=yesterday", Some(&token))
        .await;
    assert_eq!(bad_version.status, StatusCode::NOT_FOUND);

    let no_name = app.post("/api/restore", Some(&token)).await;
    assert_eq!(no_name.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_rejects_malformed_hash() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;

    let response = app
        .post("/api/check?filename=a.txt&filehash=xyz", Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_accepts_uppercase_hash() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;
    app.upload(Some(&token), Some("alice"), "a.txt", b"hello")
        .await;

    let hash = sha256_hex(b"hello").to_uppercase();
    let response = app
        .post(
            &format!("/api/check?filename=a.txt&filehash={hash}"),
            Some(&token),
        )
        .await;

    assert_eq!(response.json()["exists"], true);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = TestApp::with_config(|config| config.storage.max_upload_size_bytes = 16).await;
    let token = app.login("alice").await;

    let response = app
        .upload(Some(&token), Some("alice"), "big.bin", &[7u8; 64])
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let listing = app.get("/api/list", Some(&token), None).await.json();
    assert!(listing["files"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_parent_folder_names_do_not_block_upload() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;

    let response = app
        .upload(Some(&token), Some("alice"), "/home/alice/dev/notes.txt", b"n")
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let listing = app.get("/api/list", Some(&token), None).await.json();
    assert_eq!(versions(&listing, "notes.txt").len(), 1);
}

#[tokio::test]
async fn test_overlong_filename_is_rejected_as_unsafe() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;

    let name = format!("{}.txt", "a".repeat(300));
    let response = app.upload(Some(&token), Some("alice"), &name, b"x").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "UNSAFE_PATH");
}
