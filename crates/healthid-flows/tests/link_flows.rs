//! Scenarios for the OTP-login and QR linking paths.

use std::sync::Arc;

use healthid_core::FlowError;
use healthid_domain::{DomainError, IdentityRecord};
use healthid_flows::link_with_otp::steps;
use healthid_flows::{
    LinkWithOtp, LinkWithQr, NotifyLevel, OtpLinkConfig, RecordingNotifier, WizardError,
};
use healthid_providers::{
    ops, CheckAuthMethodsResponse, MockIdentityProvider, OtpSentResponse, ProviderError,
    VerifyLoginOtpResponse,
};

fn linked_identity() -> IdentityRecord {
    IdentityRecord {
        external_id: "abha-7".into(),
        identity_address: "ravi_s".into(),
        name: "Ravi S".into(),
        ..IdentityRecord::default()
    }
}

fn otp_sent(txn: &str) -> OtpSentResponse {
    OtpSentResponse {
        transaction_id: txn.into(),
        detail: "otp sent".into(),
    }
}

struct Harness {
    provider: Arc<MockIdentityProvider>,
    notifier: Arc<RecordingNotifier>,
    wizard: LinkWithOtp,
}

fn harness() -> Harness {
    let provider = Arc::new(MockIdentityProvider::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let mut wizard = LinkWithOtp::new(
        provider.clone(),
        notifier.clone(),
        OtpLinkConfig::default(),
    )
    .expect("static registry");
    wizard.accept_all_disclaimers();
    Harness {
        provider,
        notifier,
        wizard,
    }
}

#[tokio::test]
async fn aadhaar_number_maps_to_aadhaar_otp_without_asking_the_provider() {
    let h = harness();
    let methods = h
        .wizard
        .discover_auth_methods("1234 5678 9012")
        .await
        .unwrap();
    assert_eq!(methods, vec!["AADHAAR_OTP"]);
    assert!(h.provider.calls().is_empty());
}

#[tokio::test]
async fn mobile_number_maps_to_mobile_otp() {
    let h = harness();
    let methods = h
        .wizard
        .discover_auth_methods("98765 43210")
        .await
        .unwrap();
    assert_eq!(methods, vec!["MOBILE_OTP"]);
    assert!(h.provider.calls().is_empty());
}

#[tokio::test]
async fn identity_address_asks_the_provider_and_filters_to_supported() {
    let h = harness();
    h.provider.enqueue_ok(
        ops::CHECK_AUTH_METHODS,
        CheckAuthMethodsResponse {
            auth_methods: vec![
                "AADHAAR_OTP".into(),
                "PASSWORD".into(),
                "AADHAAR_BIO".into(),
                "MOBILE_OTP".into(),
            ],
        },
    );

    let methods = h.wizard.discover_auth_methods("ravi_s").await.unwrap();
    assert_eq!(methods, vec!["AADHAAR_OTP", "MOBILE_OTP"]);
}

#[tokio::test]
async fn no_supported_method_warns_and_errors() {
    let h = harness();
    h.provider.enqueue_ok(
        ops::CHECK_AUTH_METHODS,
        CheckAuthMethodsResponse {
            auth_methods: vec!["PASSWORD".into()],
        },
    );

    let result = h.wizard.discover_auth_methods("ravi_s").await;
    assert!(matches!(result, Err(WizardError::NoSupportedAuthMethod)));
    assert!(h.notifier.has_level(NotifyLevel::Warning));
}

#[tokio::test]
async fn too_short_id_is_rejected_locally() {
    let h = harness();
    let result = h.wizard.discover_auth_methods("ab").await;
    assert!(matches!(
        result,
        Err(WizardError::Validation(DomainError::InvalidLoginId))
    ));
    assert!(h.provider.calls().is_empty());
}

#[tokio::test]
async fn full_login_round_trip_links_the_identity() {
    let h = harness();
    h.provider.enqueue_ok(ops::SEND_LOGIN_OTP, otp_sent("T1"));
    h.provider.enqueue_ok(
        ops::VERIFY_LOGIN_OTP,
        VerifyLoginOtpResponse {
            identity: linked_identity(),
        },
    );

    h.wizard.discover_auth_methods("123456789012").await.unwrap();
    h.wizard.send_otp("AADHAAR_OTP").await.unwrap();
    assert_eq!(h.wizard.current_step(), steps::VERIFY_ID);

    let identity = h.wizard.verify_otp("654321").await.unwrap().unwrap();
    assert_eq!(identity.external_id, "abha-7");
    assert!(h.wizard.is_completed());

    // The verify carried the threaded transaction and the aadhaar system.
    let last = h.provider.last_request(ops::VERIFY_LOGIN_OTP).unwrap();
    assert_eq!(last["transaction_id"], "T1");
    assert_eq!(last["otp_system"], "aadhaar");
}

#[tokio::test]
async fn sending_over_an_unoffered_method_is_rejected() {
    let h = harness();
    h.wizard.discover_auth_methods("123456789012").await.unwrap();

    let result = h.wizard.send_otp("MOBILE_OTP").await;
    assert!(matches!(
        result,
        Err(WizardError::UnsupportedAuthMethod(_))
    ));
    assert!(h.provider.calls().is_empty());
}

#[tokio::test]
async fn login_resend_is_bounded_at_the_policy_maximum() {
    let h = harness();
    h.provider.enqueue_ok(ops::SEND_LOGIN_OTP, otp_sent("T1"));
    h.provider.enqueue_ok(ops::SEND_LOGIN_OTP, otp_sent("T2"));
    h.provider.enqueue_ok(ops::SEND_LOGIN_OTP, otp_sent("T3"));
    h.provider.enqueue_ok(ops::SEND_LOGIN_OTP, otp_sent("T4"));

    h.wizard.discover_auth_methods("123456789012").await.unwrap();
    h.wizard.send_otp("AADHAAR_OTP").await.unwrap();

    for _ in 0..3 {
        h.wizard.resend_otp().await.unwrap();
    }
    assert!(!h.wizard.can_resend_otp());
    let result = h.wizard.resend_otp().await;
    assert!(matches!(
        result,
        Err(WizardError::Flow(FlowError::RetryExhausted))
    ));
    // Initial send plus three resends, nothing more.
    assert_eq!(h.provider.calls_for(ops::SEND_LOGIN_OTP), 4);
    // The latest transaction id won.
    assert_eq!(h.wizard.memory().transaction.value(), "T4");
}

#[tokio::test]
async fn failed_login_resend_leaves_the_count_untouched() {
    let h = harness();
    h.provider.enqueue_ok(ops::SEND_LOGIN_OTP, otp_sent("T1"));
    h.provider.enqueue_err(
        ops::SEND_LOGIN_OTP,
        ProviderError::Unavailable("gateway timeout".into()),
    );
    h.provider.enqueue_ok(ops::SEND_LOGIN_OTP, otp_sent("T2"));

    h.wizard.discover_auth_methods("123456789012").await.unwrap();
    h.wizard.send_otp("AADHAAR_OTP").await.unwrap();

    let result = h.wizard.resend_otp().await;
    assert!(matches!(result, Err(WizardError::Provider(_))));
    // The failure did not consume an attempt; trying again works.
    assert!(h.wizard.can_resend_otp());
    h.wizard.resend_otp().await.unwrap();
    assert_eq!(h.wizard.memory().resend_otp.count(), 1);
}

#[tokio::test]
async fn going_back_clears_the_pending_transaction() {
    let h = harness();
    h.provider.enqueue_ok(ops::SEND_LOGIN_OTP, otp_sent("T1"));

    h.wizard.discover_auth_methods("123456789012").await.unwrap();
    h.wizard.send_otp("AADHAAR_OTP").await.unwrap();
    h.wizard.back_to_enter_id().unwrap();

    assert_eq!(h.wizard.current_step(), steps::ENTER_ID);
    assert!(h.wizard.memory().transaction.is_empty());
    assert_eq!(h.wizard.memory().resend_otp.count(), 0);
}

#[tokio::test]
async fn qr_link_submits_the_decoded_record() {
    let provider = Arc::new(MockIdentityProvider::new());
    let notifier = Arc::new(RecordingNotifier::new());
    provider.enqueue_ok(ops::CREATE_FROM_QR, linked_identity());

    let flow = LinkWithQr::new(provider.clone(), notifier.clone());
    let scanned = r#"{
        "hidn": "12345678901234",
        "name": "Ravi S",
        "gender": "M",
        "dob": "02-01-1988",
        "state_name": "Kerala"
    }"#;
    let identity = flow.link(scanned).await.unwrap();
    assert_eq!(identity.external_id, "abha-7");

    let sent = provider.last_request(ops::CREATE_FROM_QR).unwrap();
    assert_eq!(sent["primary_id_number"], "12345678901234");
    assert_eq!(sent["state"], "Kerala");
    assert!(notifier.has_level(NotifyLevel::Success));
}

#[tokio::test]
async fn qr_link_rejects_malformed_payloads_before_any_call() {
    let provider = Arc::new(MockIdentityProvider::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let flow = LinkWithQr::new(provider.clone(), notifier.clone());
    let result = flow.link("not a qr payload").await;
    assert!(matches!(
        result,
        Err(WizardError::Validation(DomainError::QrDecode(_)))
    ));
    assert!(provider.calls().is_empty());
    assert!(notifier.has_level(NotifyLevel::Error));
}
