//! Integration tests for request failures and their classification.

mod common;

use std::{net::TcpListener, sync::Arc, time::Duration};

use common::*;

#[tokio::test]
async fn test_slow_response_times_out() -> anyhow::Result<()> {
    let backend = Backend::start();
    let api = client_with(
        &backend,
        Arc::new(MemoryCredentialStore::default()),
        Duration::from_millis(200),
    );

    let err = api
        .get::<serde_json::Value>("slow/", &[])
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    assert_eq!(err.user_message(), "Unable to reach the server. Please try again.");
    assert_eq!(backend.requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_failure() -> anyhow::Result<()> {
    // grab a free port, then close it again
    let port = TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();
    let config = ApiConfig::new(&format!("http://127.0.0.1:{port}/api"), Duration::from_secs(2))?;
    let api = ApiClient::new(config, Arc::new(MemoryCredentialStore::default()))?;

    let err = api.list_trainees().await.unwrap_err();

    assert!(
        matches!(
            err,
            ApiError::Network {
                kind: NetworkFailure::Unreachable,
                ..
            }
        ),
        "unexpected error {err:?}"
    );
    Ok(())
}

#[tokio::test]
async fn test_error_statuses_are_classified() -> anyhow::Result<()> {
    let backend = Backend::start();
    let trainee = signed_in(&backend, TRAINEE).await;

    let forbidden = trainee.api().list_trainees().await.unwrap_err();
    assert!(matches!(forbidden, ApiError::Forbidden(_)));
    assert_eq!(forbidden.status(), Some(403));

    let missing = trainee.api().get_project(4242).await.unwrap_err();
    assert!(matches!(missing, ApiError::NotFound(_)));

    // neither closes the session
    assert!(trainee.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn test_trainer_lists_trainees() -> anyhow::Result<()> {
    let backend = Backend::start();
    let trainer = signed_in(&backend, TRAINER).await;

    let trainees = trainer.api().list_trainees().await?;

    let names: Vec<String> = trainees.iter().map(ToString::to_string).collect();
    assert_eq!(names, [TRAINEE.0, OTHER_TRAINEE.0]);
    Ok(())
}

#[tokio::test]
async fn test_validation_errors_keep_field_names() -> anyhow::Result<()> {
    let backend = Backend::start();
    let trainer = signed_in(&backend, TRAINER).await;

    let err = trainer
        .api()
        .post::<_, serde_json::Value>("mini-projects/", &serde_json::json!({"title": 1}))
        .await
        .unwrap_err();

    let ApiError::Validation(fields) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(
        fields.get("title"),
        Some(&["This field is required.".to_string()][..])
    );
    Ok(())
}
