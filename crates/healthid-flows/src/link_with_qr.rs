//! "Link with QR" path: create an identity directly from a scanned QR
//! payload. No steps, no OTP; decode, map, submit.

use std::sync::Arc;

use tracing::debug;

use healthid_domain::{IdentityRecord, QrPayload};
use healthid_providers::{IdentityProvider, ProviderError};

use crate::errors::WizardError;
use crate::notify::Notifier;

pub struct LinkWithQr {
    provider: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
}

impl LinkWithQr {
    pub fn new(provider: Arc<dyn IdentityProvider>, notifier: Arc<dyn Notifier>) -> Self {
        Self { provider, notifier }
    }

    /// Decodes the scanned text and submits the mapped record. A payload
    /// that does not decode, or decodes without exactly one identity
    /// field, is rejected before anything is sent.
    pub async fn link(&self, scanned: &str) -> Result<IdentityRecord, WizardError> {
        let payload = match QrPayload::decode(scanned) {
            Ok(payload) => payload,
            Err(e) => {
                self.notifier.error(&e.to_string());
                return Err(e.into());
            }
        };
        let record = payload.into_record();
        debug!(external_id = %record.external_id, "submitting record from qr scan");

        match self.provider.create_from_qr(record).await {
            Ok(identity) => {
                self.notifier.success("identity linked from qr code");
                Ok(identity)
            }
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    fn provider_failure(&self, error: ProviderError) -> WizardError {
        self.notifier.error(&error.to_string());
        error.into()
    }
}
