//! Contract tests for the identity notifications handler
//!
//! Constraints verified:
//! - Create refuses to clobber live topic bindings unless ForceOverride
//! - Forwarding cannot be disabled without bounce and complaint topics
//! - The physical id is the identity ARN
//! - Delete restores the service defaults, tolerating a drifted identity

mod common;

use common::*;
use serde_json::json;
use sesres_core::traits::NotificationAttributes;
use sesres_core::{Status, COULD_NOT_CREATE};
use std::sync::atomic::Ordering;
use std::sync::Arc;

const BOUNCE_ARN: &str = "arn:aws:sns:eu-west-1:123456789012:bounces";
const COMPLAINT_ARN: &str = "arn:aws:sns:eu-west-1:123456789012:complaints";

fn properties() -> serde_json::Value {
    json!({
        "Identity": "abc.internal",
        "Region": "eu-west-1",
        "BounceTopic": BOUNCE_ARN,
        "ComplaintTopic": COMPLAINT_ARN
    })
}

#[tokio::test]
async fn create_binds_topics_and_reports_the_identity_arn() {
    let factory = Arc::new(FakeFactory::new(FakeSes::new().with_identity("abc.internal")));
    let dispatcher = dispatcher(factory.clone());

    let outcome = dispatcher
        .dispatch(create_request("Custom::IdentityNotifications", properties()))
        .await;

    assert_eq!(outcome.response.status, Status::Success);
    assert_eq!(
        outcome.response.physical_resource_id.as_deref(),
        Some("arn:aws:ses:eu-west-1:123456789012:identity/abc.internal")
    );

    let attrs = factory.ses.notifications.lock().unwrap()["abc.internal"].clone();
    assert_eq!(attrs.bounce_topic.as_deref(), Some(BOUNCE_ARN));
    assert_eq!(attrs.complaint_topic.as_deref(), Some(COMPLAINT_ARN));
    assert_eq!(attrs.delivery_topic, None);
    assert!(attrs.forwarding_enabled);

    // One topic call per feedback type, headers only for the bound ones.
    assert_eq!(factory.ses.set_topic_calls.load(Ordering::SeqCst), 3);
    assert_eq!(factory.ses.set_headers_calls.load(Ordering::SeqCst), 2);
    assert_eq!(factory.ses.set_forwarding_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn create_refuses_to_clobber_live_bindings() {
    let ses = FakeSes::new().with_identity("abc.internal");
    ses.notifications.lock().unwrap().insert(
        "abc.internal".to_string(),
        NotificationAttributes {
            bounce_topic: Some("arn:aws:sns:eu-west-1:999999999999:other".to_string()),
            forwarding_enabled: true,
            ..Default::default()
        },
    );
    let factory = Arc::new(FakeFactory::new(ses));
    let dispatcher = dispatcher(factory.clone());

    let outcome = dispatcher
        .dispatch(create_request("Custom::IdentityNotifications", properties()))
        .await;

    assert_eq!(outcome.response.status, Status::Failed);
    assert!(outcome
        .response
        .reason
        .as_deref()
        .unwrap()
        .contains("BounceTopic already set"));
    assert_eq!(factory.ses.set_topic_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn force_override_clobbers_live_bindings() {
    let ses = FakeSes::new().with_identity("abc.internal");
    ses.notifications.lock().unwrap().insert(
        "abc.internal".to_string(),
        NotificationAttributes {
            bounce_topic: Some("arn:aws:sns:eu-west-1:999999999999:other".to_string()),
            forwarding_enabled: true,
            ..Default::default()
        },
    );
    let factory = Arc::new(FakeFactory::new(ses));
    let dispatcher = dispatcher(factory.clone());

    let mut props = properties();
    props["ForceOverride"] = json!(true);
    let outcome = dispatcher
        .dispatch(create_request("Custom::IdentityNotifications", props))
        .await;

    assert_eq!(outcome.response.status, Status::Success);
    let attrs = factory.ses.notifications.lock().unwrap()["abc.internal"].clone();
    assert_eq!(attrs.bounce_topic.as_deref(), Some(BOUNCE_ARN));
}

#[tokio::test]
async fn forwarding_cannot_be_disabled_without_both_topics() {
    let ses = FakeSes::new().with_identity("abc.internal");
    ses.notifications.lock().unwrap().insert(
        "abc.internal".to_string(),
        NotificationAttributes {
            forwarding_enabled: true,
            ..Default::default()
        },
    );
    let factory = Arc::new(FakeFactory::new(ses));
    let dispatcher = dispatcher(factory.clone());

    let outcome = dispatcher
        .dispatch(create_request(
            "Custom::IdentityNotifications",
            json!({
                "Identity": "abc.internal",
                "Region": "eu-west-1",
                "BounceTopic": BOUNCE_ARN,
                "ForwardingEnabled": false
            }),
        ))
        .await;

    assert_eq!(outcome.response.status, Status::Failed);
    assert!(outcome
        .response
        .reason
        .as_deref()
        .unwrap()
        .contains("ForwardingEnabled cannot be disabled"));
    assert_eq!(factory.ses.mutation_count(), 0);
}

#[tokio::test]
async fn malformed_topic_arn_fails_validation_before_any_call() {
    let factory = Arc::new(FakeFactory::new(FakeSes::new()));
    let dispatcher = dispatcher(factory.clone());

    let outcome = dispatcher
        .dispatch(create_request(
            "Custom::IdentityNotifications",
            json!({
                "Identity": "abc.internal",
                "Region": "eu-west-1",
                "BounceTopic": "not-an-arn"
            }),
        ))
        .await;

    assert_eq!(outcome.response.status, Status::Failed);
    assert_eq!(
        outcome.response.physical_resource_id.as_deref(),
        Some(COULD_NOT_CREATE)
    );
    assert_eq!(factory.ses.mutation_count(), 0);
}

#[tokio::test]
async fn unchanged_update_makes_no_service_calls() {
    let factory = Arc::new(FakeFactory::new(FakeSes::new().with_identity("abc.internal")));
    let dispatcher = dispatcher(factory.clone());

    let outcome = dispatcher
        .dispatch(update_request(
            "Custom::IdentityNotifications",
            properties(),
            properties(),
            "arn:aws:ses:eu-west-1:123456789012:identity/abc.internal",
        ))
        .await;

    assert_eq!(outcome.response.status, Status::Success);
    assert_eq!(factory.ses.mutation_count(), 0);
}

#[tokio::test]
async fn same_identity_update_skips_the_clobber_probe() {
    let ses = FakeSes::new().with_identity("abc.internal");
    // A topic this resource itself bound earlier must not block its update.
    ses.notifications.lock().unwrap().insert(
        "abc.internal".to_string(),
        NotificationAttributes {
            bounce_topic: Some(BOUNCE_ARN.to_string()),
            forwarding_enabled: true,
            ..Default::default()
        },
    );
    let factory = Arc::new(FakeFactory::new(ses));
    let dispatcher = dispatcher(factory.clone());

    let mut props = properties();
    props["DeliveryTopic"] = json!("arn:aws:sns:eu-west-1:123456789012:deliveries");
    let outcome = dispatcher
        .dispatch(update_request(
            "Custom::IdentityNotifications",
            props,
            properties(),
            "arn:aws:ses:eu-west-1:123456789012:identity/abc.internal",
        ))
        .await;

    assert_eq!(outcome.response.status, Status::Success);
    assert_eq!(factory.ses.set_topic_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn delete_restores_service_defaults() {
    let ses = FakeSes::new().with_identity("abc.internal");
    ses.notifications.lock().unwrap().insert(
        "abc.internal".to_string(),
        NotificationAttributes {
            bounce_topic: Some(BOUNCE_ARN.to_string()),
            complaint_topic: Some(COMPLAINT_ARN.to_string()),
            forwarding_enabled: false,
            ..Default::default()
        },
    );
    let factory = Arc::new(FakeFactory::new(ses));
    let dispatcher = dispatcher(factory.clone());

    let outcome = dispatcher
        .dispatch(delete_request(
            "Custom::IdentityNotifications",
            properties(),
            "arn:aws:ses:eu-west-1:123456789012:identity/abc.internal",
        ))
        .await;

    assert_eq!(outcome.response.status, Status::Success);
    let attrs = factory.ses.notifications.lock().unwrap()["abc.internal"].clone();
    assert_eq!(attrs.bounce_topic, None);
    assert_eq!(attrs.complaint_topic, None);
    assert_eq!(attrs.delivery_topic, None);
    assert!(attrs.forwarding_enabled);
}

#[tokio::test]
async fn delete_tolerates_an_identity_removed_out_of_band() {
    // No identity registered: every setter errors, as the live service
    // does for an unknown identity.
    let factory = Arc::new(FakeFactory::new(FakeSes::new()));
    let dispatcher = dispatcher(factory.clone());

    let outcome = dispatcher
        .dispatch(delete_request(
            "Custom::IdentityNotifications",
            properties(),
            "arn:aws:ses:eu-west-1:123456789012:identity/abc.internal",
        ))
        .await;

    assert_eq!(outcome.response.status, Status::Success);
    assert!(outcome
        .response
        .reason
        .as_deref()
        .unwrap()
        .contains("ignoring failed reset"));
}

#[tokio::test]
async fn delete_with_sentinel_is_a_noop() {
    let factory = Arc::new(FakeFactory::new(FakeSes::new()));
    let dispatcher = dispatcher(factory.clone());

    let outcome = dispatcher
        .dispatch(delete_request(
            "Custom::IdentityNotifications",
            properties(),
            COULD_NOT_CREATE,
        ))
        .await;

    assert_eq!(outcome.response.status, Status::Success);
    assert_eq!(factory.ses.mutation_count(), 0);
}
