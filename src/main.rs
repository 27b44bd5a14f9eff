//! Demo binary: drives the "Create with Aadhaar" wizard end to end
//! against the scriptable mock provider and prints the resulting event
//! log. Useful as living documentation of the step sequence.

use std::sync::Arc;

use tracing::info;

use healthid_domain::{Gender, IdentityRecord};
use healthid_flows::{AadhaarCreateConfig, CreateWithAadhaar, TracingNotifier, WizardError};
use healthid_providers::{
    ops, EnrollAddressResponse, MockIdentityProvider, OtpSentResponse, SuggestAddressesResponse,
    VerifyPrimaryOtpResponse,
};

fn scripted_provider() -> Arc<MockIdentityProvider> {
    let provider = MockIdentityProvider::new();
    provider.enqueue_ok(
        ops::SEND_PRIMARY_OTP,
        OtpSentResponse {
            transaction_id: "T1".into(),
            detail: "otp sent to the mobile linked with aadhaar".into(),
        },
    );
    provider.enqueue_ok(
        ops::VERIFY_PRIMARY_OTP,
        VerifyPrimaryOtpResponse {
            transaction_id: "T2".into(),
            detail: "aadhaar verified".into(),
            is_new: true,
            identity: IdentityRecord {
                external_id: "demo-1".into(),
                primary_id_number: "123456789012".into(),
                name: "Asha Kumar".into(),
                gender: Gender::Female,
                mobile: "9000000000".into(),
                ..IdentityRecord::default()
            },
        },
    );
    provider.enqueue_ok(
        ops::LINK_MOBILE,
        OtpSentResponse {
            transaction_id: "T3".into(),
            detail: "otp sent to the new mobile".into(),
        },
    );
    provider.enqueue_ok(
        ops::VERIFY_MOBILE_OTP,
        OtpSentResponse {
            transaction_id: "T4".into(),
            detail: "mobile linked".into(),
        },
    );
    provider.enqueue_ok(
        ops::SUGGEST_ADDRESSES,
        SuggestAddressesResponse {
            transaction_id: "T5".into(),
            suggestions: vec!["asha.kumar".into(), "asha_1992".into()],
        },
    );
    provider.enqueue_ok(
        ops::ENROLL_ADDRESS,
        EnrollAddressResponse {
            transaction_id: "T6".into(),
            identity: IdentityRecord {
                external_id: "demo-1".into(),
                identity_address: "asha.kumar".into(),
                name: "Asha Kumar".into(),
                ..IdentityRecord::default()
            },
        },
    );
    Arc::new(provider)
}

#[tokio::main]
async fn main() -> Result<(), WizardError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,healthid_core=debug".into()),
        )
        .init();

    let provider = scripted_provider();
    let mut wizard = CreateWithAadhaar::new(
        provider,
        Arc::new(TracingNotifier),
        AadhaarCreateConfig::default(),
    )?;

    wizard.accept_all_disclaimers();
    wizard.set_beneficiary_name("Asha Kumar");
    wizard.set_aadhaar_number("1234 5678 9012");
    wizard.set_mobile_number("9876543210");

    wizard.submit_aadhaar().await?;
    info!(step = %wizard.current_step(), "otp issued");

    wizard.submit_otp("111111").await?;
    info!(step = %wizard.current_step(), "aadhaar verified, linking new mobile");

    wizard.submit_link_mobile().await?;
    wizard.submit_mobile_otp("222222").await?;

    let suggestions = wizard.fetch_address_suggestions().await?;
    info!(?suggestions, "picking the first suggested address");

    if let Some(address) = suggestions.first() {
        if let Some(identity) = wizard.submit_address(address).await? {
            info!(
                external_id = %identity.external_id,
                address = %identity.identity_address,
                "wizard finished"
            );
        }
    }

    for event in wizard.events() {
        info!(seq = event.seq, kind = ?event.kind, "flow event");
    }
    Ok(())
}
