//! "Link with OTP" wizard: log into an existing identity.
//!
//! Two steps: classify the entered id and discover auth methods, then
//! verify the OTP sent over the chosen channel. The raw id is never sent
//! anywhere before classification.

use std::sync::Arc;

use healthid_core::{
    FlowError, FlowEvent, OtpRetryPolicy, RetryCounter, StepDefinition, StepFlow, StepRegistry,
    TransactionThread,
};
use healthid_domain::{
    classify_id, normalize_id, validate_otp, DomainError, IdClass, IdentityRecord,
};
use healthid_providers::{
    CheckAuthMethodsRequest, IdentityProvider, OtpSystem, ProviderError, SendLoginOtpRequest,
    VerifyLoginOtpRequest, SUPPORTED_AUTH_METHODS,
};

use crate::disclaimer::DisclaimerSet;
use crate::errors::WizardError;
use crate::notify::Notifier;

pub mod steps {
    pub const ENTER_ID: &str = "enter-id";
    pub const VERIFY_ID: &str = "verify-id";
}

pub const DISCLAIMER_COUNT: usize = 5;

/// Minimum length of a usable login id; anything shorter cannot even be
/// an identity-address candidate.
const MIN_ID_LENGTH: usize = 4;

#[derive(Debug, Clone)]
pub struct OtpLinkMemory {
    pub id: String,
    pub id_class: IdClass,
    pub otp_system: OtpSystem,
    pub transaction: TransactionThread,
    pub resend_otp: RetryCounter,
    pub auth_methods: Vec<String>,
}

impl Default for OtpLinkMemory {
    fn default() -> Self {
        Self {
            id: String::new(),
            id_class: IdClass::Aadhaar,
            otp_system: OtpSystem::Aadhaar,
            transaction: TransactionThread::default(),
            resend_otp: RetryCounter::default(),
            auth_methods: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OtpLinkConfig {
    pub retry: OtpRetryPolicy,
}

impl Default for OtpLinkConfig {
    fn default() -> Self {
        Self {
            retry: OtpRetryPolicy::default(),
        }
    }
}

pub struct LinkWithOtp {
    flow: StepFlow<OtpLinkMemory>,
    provider: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    config: OtpLinkConfig,
    disclaimers: DisclaimerSet,
}

fn registry() -> Result<StepRegistry<OtpLinkMemory>, FlowError> {
    StepRegistry::builder()
        .step(StepDefinition::new(steps::ENTER_ID))
        .step(StepDefinition::new(steps::VERIFY_ID))
        .build()
}

impl LinkWithOtp {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
        config: OtpLinkConfig,
    ) -> Result<Self, WizardError> {
        let flow = StepFlow::new(registry()?, OtpLinkMemory::default())?;
        Ok(Self {
            flow,
            provider,
            notifier,
            config,
            disclaimers: DisclaimerSet::new(DISCLAIMER_COUNT),
        })
    }

    pub fn accept_disclaimer(&mut self, index: usize) -> bool {
        self.disclaimers.accept(index)
    }

    pub fn accept_all_disclaimers(&mut self) {
        self.disclaimers.accept_all();
    }

    // ---- enter-id ---------------------------------------------------

    /// Classifies the entered id and returns the auth methods the user
    /// can pick from. Aadhaar and mobile numbers map to a fixed channel;
    /// everything else asks the provider and filters to what this client
    /// can drive.
    pub async fn discover_auth_methods(&self, raw_id: &str) -> Result<Vec<String>, WizardError> {
        self.expect_step(steps::ENTER_ID, "discover_auth_methods")?;
        if !self.disclaimers.all_accepted() {
            return Err(WizardError::DisclaimersNotAccepted);
        }
        let id = normalize_id(raw_id);
        if id.len() < MIN_ID_LENGTH {
            return Err(DomainError::InvalidLoginId.into());
        }
        let class = classify_id(&id);

        let methods = match class {
            IdClass::Aadhaar => vec!["AADHAAR_OTP".to_string()],
            IdClass::Mobile => vec!["MOBILE_OTP".to_string()],
            IdClass::IdentityNumber | IdClass::IdentityAddress => {
                let resp = match self
                    .provider
                    .check_auth_methods(CheckAuthMethodsRequest {
                        identity_address: id.clone(),
                    })
                    .await
                {
                    Ok(resp) => resp,
                    Err(e) => return Err(self.provider_failure(e)),
                };
                resp.auth_methods
                    .into_iter()
                    .filter(|m| SUPPORTED_AUTH_METHODS.contains(&m.as_str()))
                    .collect()
            }
        };

        if methods.is_empty() {
            self.notifier
                .warning("no supported authentication method for this id");
            return Err(WizardError::NoSupportedAuthMethod);
        }
        self.apply(|m| {
            m.id = id;
            m.id_class = class;
            m.auth_methods = methods.clone();
        })?;
        Ok(methods)
    }

    /// Sends a login OTP over the chosen method and advances to the
    /// verification step.
    pub async fn send_otp(&self, method: &str) -> Result<(), WizardError> {
        self.expect_step(steps::ENTER_ID, "send_otp")?;
        let memory = self.flow.snapshot();
        if !memory.auth_methods.iter().any(|m| m == method) {
            return Err(WizardError::UnsupportedAuthMethod(method.to_string()));
        }
        let otp_system = if method == "AADHAAR_OTP" {
            OtpSystem::Aadhaar
        } else {
            OtpSystem::Abdm
        };

        let _guard = self.flow.begin_request()?;
        match self
            .provider
            .send_login_otp(SendLoginOtpRequest {
                value: memory.id.clone(),
                id_type: memory.id_class,
                otp_system,
            })
            .await
        {
            Ok(resp) => {
                self.apply(|m| {
                    m.otp_system = otp_system;
                    m.transaction.set(&resp.transaction_id);
                })?;
                self.notifier.success(&resp.detail);
                self.flow.go_to(steps::VERIFY_ID)?;
                Ok(())
            }
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    // ---- verify-id --------------------------------------------------

    /// Verifies the login OTP. Success completes the flow and yields the
    /// linked identity record.
    pub async fn verify_otp(&self, otp: &str) -> Result<Option<IdentityRecord>, WizardError> {
        self.expect_step(steps::VERIFY_ID, "verify_otp")?;
        validate_otp(otp)?;
        let memory = self.flow.snapshot();
        let txn = memory.transaction.require()?;

        let _guard = self.flow.begin_request()?;
        match self
            .provider
            .verify_login_otp(VerifyLoginOtpRequest {
                id_type: memory.id_class,
                otp: otp.to_string(),
                transaction_id: txn.clone(),
                otp_system: memory.otp_system,
            })
            .await
        {
            Ok(resp) => {
                // Discard answers issued against a superseded transaction.
                self.flow.snapshot().transaction.ensure_current(&txn)?;
                self.flow.complete();
                self.notifier.success("identity linked");
                Ok(Some(resp.identity))
            }
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    /// Re-sends the login OTP over the already-chosen channel. A failed
    /// resend notifies but leaves the count untouched, so the user may
    /// try again within the bound.
    pub async fn resend_otp(&self) -> Result<(), WizardError> {
        self.expect_step(steps::VERIFY_ID, "resend_otp")?;
        let memory = self.flow.snapshot();
        memory.resend_otp.check(&self.config.retry)?;

        let _guard = self.flow.begin_request()?;
        match self
            .provider
            .send_login_otp(SendLoginOtpRequest {
                value: memory.id.clone(),
                id_type: memory.id_class,
                otp_system: memory.otp_system,
            })
            .await
        {
            Ok(resp) => {
                self.apply(|m| {
                    m.transaction.set(&resp.transaction_id);
                    m.resend_otp.record();
                })?;
                self.notifier.success(&resp.detail);
                Ok(())
            }
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    pub fn can_resend_otp(&self) -> bool {
        self.flow.snapshot().resend_otp.can_resend(&self.config.retry)
    }

    /// Returns to the id entry step, keeping the entered id but dropping
    /// the pending transaction.
    pub fn back_to_enter_id(&self) -> Result<(), WizardError> {
        self.expect_step(steps::VERIFY_ID, "back_to_enter_id")?;
        self.apply(|m| {
            m.transaction.clear();
            m.resend_otp.reset();
        })?;
        self.flow.go_to(steps::ENTER_ID)?;
        Ok(())
    }

    // ---- shared -----------------------------------------------------

    pub fn current_step(&self) -> String {
        self.flow.current_step()
    }

    pub fn memory(&self) -> OtpLinkMemory {
        self.flow.snapshot()
    }

    pub fn events(&self) -> Vec<FlowEvent> {
        self.flow.events()
    }

    pub fn is_completed(&self) -> bool {
        self.flow.is_completed()
    }

    pub fn close(&self) {
        self.flow.close();
    }

    fn expect_step(&self, step: &'static str, action: &'static str) -> Result<(), WizardError> {
        let current = self.flow.current_step();
        if current == step {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                action,
                step: current,
            })
        }
    }

    fn apply<F>(&self, f: F) -> Result<(), WizardError>
    where
        F: FnOnce(&mut OtpLinkMemory),
    {
        if self.flow.update_memory(f) {
            Ok(())
        } else {
            Err(FlowError::FlowClosed.into())
        }
    }

    fn provider_failure(&self, error: ProviderError) -> WizardError {
        self.notifier.error(&error.to_string());
        error.into()
    }
}
