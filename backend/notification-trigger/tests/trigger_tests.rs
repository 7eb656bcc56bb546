/// Tests for the notification trigger flow
///
/// This test module covers:
/// - Early exits for anonymous callers and missing tokens
/// - The two-message fan-out and its addressing
/// - Reporting of the gateway's accepted count
/// - Propagation of datastore and gateway failures
mod common;

use common::*;
use firebase_shared::FirebaseError;
use notification_trigger::models::CallerContext;
use notification_trigger::AppError;

#[tokio::test]
async fn anonymous_caller_is_unauthenticated() {
    let mut store = MockStore::new();
    store.expect_fetch_token_record().never();
    let mut gateway = MockGateway::new();
    gateway.expect_send_each().never();

    let err = trigger(store, gateway)
        .trigger(&CallerContext::anonymous())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Unauthenticated));
    assert_eq!(err.code(), "unauthenticated");
}

#[tokio::test]
async fn missing_document_is_failed_precondition() {
    let mut store = MockStore::new();
    store
        .expect_fetch_token_record()
        .withf(|uid: &str| uid == "u1")
        .times(1)
        .returning(|_| Ok(None));
    let mut gateway = MockGateway::new();
    gateway.expect_send_each().never();

    let err = trigger(store, gateway)
        .trigger(&CallerContext::authenticated("u1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PreconditionFailed));
    assert_eq!(err.code(), "failed-precondition");
}

#[tokio::test]
async fn empty_token_is_failed_precondition() {
    let mut store = MockStore::new();
    store
        .expect_fetch_token_record()
        .times(1)
        .returning(|_| Ok(Some(record(Some("")))));
    let mut gateway = MockGateway::new();
    gateway.expect_send_each().never();

    let err = trigger(store, gateway)
        .trigger(&CallerContext::authenticated("u1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PreconditionFailed));
}

#[tokio::test]
async fn record_without_token_field_is_failed_precondition() {
    let mut store = MockStore::new();
    store
        .expect_fetch_token_record()
        .times(1)
        .returning(|_| Ok(Some(record(None))));
    let mut gateway = MockGateway::new();
    gateway.expect_send_each().never();

    let err = trigger(store, gateway)
        .trigger(&CallerContext::authenticated("u1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PreconditionFailed));
}

#[tokio::test]
async fn both_accepted_reports_two() {
    let mut store = MockStore::new();
    store
        .expect_fetch_token_record()
        .times(1)
        .returning(|_| Ok(Some(record(Some("abc123")))));
    let mut gateway = MockGateway::new();
    gateway
        .expect_send_each()
        .withf(|messages| {
            messages.len() == 2
                && messages.iter().all(|m| m.token == "abc123")
                && messages[0].data.get("type").map(String::as_str) == Some("expense")
                && messages[1].data.get("type").map(String::as_str) == Some("income")
        })
        .times(1)
        .returning(|_| Ok(batch(2, 2)));

    let response = trigger(store, gateway)
        .trigger(&CallerContext::authenticated("u1"))
        .await
        .unwrap();

    assert_eq!(response.status, "success");
    assert_eq!(response.message, "2 messages sent successfully.");
}

#[tokio::test]
async fn partial_acceptance_reports_gateway_count() {
    let mut store = MockStore::new();
    store
        .expect_fetch_token_record()
        .returning(|_| Ok(Some(record(Some("abc123")))));
    let mut gateway = MockGateway::new();
    gateway
        .expect_send_each()
        .times(1)
        .returning(|_| Ok(batch(1, 2)));

    let response = trigger(store, gateway)
        .trigger(&CallerContext::authenticated("u1"))
        .await
        .unwrap();

    assert_eq!(response.status, "success");
    assert_eq!(response.message, "1 messages sent successfully.");
}

#[tokio::test]
async fn nothing_accepted_is_still_success() {
    let mut store = MockStore::new();
    store
        .expect_fetch_token_record()
        .returning(|_| Ok(Some(record(Some("abc123")))));
    let mut gateway = MockGateway::new();
    gateway.expect_send_each().returning(|_| Ok(batch(0, 2)));

    let response = trigger(store, gateway)
        .trigger(&CallerContext::authenticated("u1"))
        .await
        .unwrap();

    assert_eq!(response.message, "0 messages sent successfully.");
}

#[tokio::test]
async fn messages_carry_demo_payload_fields() {
    let mut store = MockStore::new();
    store
        .expect_fetch_token_record()
        .returning(|_| Ok(Some(record(Some("abc123")))));
    let mut gateway = MockGateway::new();
    gateway
        .expect_send_each()
        .withf(|messages| {
            messages.iter().all(|m| {
                m.data.contains_key("source")
                    && m.data.contains_key("text")
                    && m.data.contains_key("type")
                    && m.android.is_some()
                    && m.apns.is_some()
            })
        })
        .returning(|_| Ok(batch(2, 2)));

    trigger(store, gateway)
        .trigger(&CallerContext::authenticated("u1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn datastore_failure_is_internal() {
    let mut store = MockStore::new();
    store.expect_fetch_token_record().returning(|_| {
        Err(FirebaseError::FirestoreApiError(
            "503 Service Unavailable".to_string(),
            "backend unavailable".to_string(),
        ))
    });
    let mut gateway = MockGateway::new();
    gateway.expect_send_each().never();

    let err = trigger(store, gateway)
        .trigger(&CallerContext::authenticated("u1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Internal(_)));
}

#[tokio::test]
async fn gateway_failure_is_internal() {
    let mut store = MockStore::new();
    store
        .expect_fetch_token_record()
        .returning(|_| Ok(Some(record(Some("abc123")))));
    let mut gateway = MockGateway::new();
    gateway
        .expect_send_each()
        .times(1)
        .returning(|_| Err(FirebaseError::TokenRequestFailed("401 Unauthorized".to_string())));

    let err = trigger(store, gateway)
        .trigger(&CallerContext::authenticated("u1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Internal(_)));
    assert_eq!(err.public_message(), "INTERNAL");
}
