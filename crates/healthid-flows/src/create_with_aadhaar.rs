//! "Create with Aadhaar" wizard: the richest flow variant.
//!
//! EnterAadhaar -> VerifyAadhaarWithOtp | VerifyAadhaarWithDemographics
//! -> HandleExistingIdentity -> LinkMobile -> VerifyMobile
//! -> ChooseIdentityAddress -> ShowProfile (terminal).
//!
//! Conditional skips are enter hooks on the registry: an identity flagged
//! as new jumps past the existing-identity choice, and a mobile that
//! already matches the linked one jumps past mobile verification.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::debug;

use healthid_core::{
    FlowError, FlowEvent, OtpRetryPolicy, RetryCounter, StepContext, StepDefinition, StepFlow,
    StepRegistry, TransactionThread,
};
use healthid_domain::{
    normalize_mobile, sanitize_digits, validate_identity_address, validate_mobile, validate_otp,
    validate_primary_id, DomainError, Gender, IdentityRecord,
};
use healthid_providers::{
    DistrictEntry, EnrollAddressRequest, IdentityProvider, LinkMobileRequest, ProviderError,
    SendPrimaryOtpRequest, StateEntry, SuggestAddressesRequest, VerifyDemographicsRequest,
    VerifyMobileOtpRequest, VerifyPrimaryOtpRequest,
};

use crate::disclaimer::DisclaimerSet;
use crate::errors::WizardError;
use crate::notify::Notifier;

pub mod steps {
    pub const ENTER_AADHAAR: &str = "enter-aadhaar";
    pub const VERIFY_AADHAAR_WITH_OTP: &str = "verify-aadhaar-with-otp";
    pub const VERIFY_AADHAAR_WITH_DEMOGRAPHICS: &str = "verify-aadhaar-with-demographics";
    pub const HANDLE_EXISTING_IDENTITY: &str = "handle-existing-identity";
    pub const LINK_MOBILE: &str = "link-mobile";
    pub const VERIFY_MOBILE: &str = "verify-mobile";
    pub const CHOOSE_IDENTITY_ADDRESS: &str = "choose-identity-address";
    pub const SHOW_PROFILE: &str = "show-profile";
}

/// Number of disclaimer acknowledgements on the first step.
pub const DISCLAIMER_COUNT: usize = 6;

/// Everything this wizard has learned so far. One record per run, shared
/// by every step, discarded when the wizard closes.
#[derive(Debug, Clone, Default)]
pub struct AadhaarCreateMemory {
    pub aadhaar_number: String,
    pub mobile_number: String,
    pub beneficiary_name: String,
    pub transaction: TransactionThread,
    pub identity: Option<IdentityRecord>,
    pub resend_otp: RetryCounter,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AadhaarCreateConfig {
    /// Demographics-based verification is offered only when the target
    /// facility supports it.
    pub demographics_enabled: bool,
    pub retry: OtpRetryPolicy,
}

impl Default for AadhaarCreateConfig {
    fn default() -> Self {
        Self {
            demographics_enabled: false,
            retry: OtpRetryPolicy::new(2, Duration::from_secs(60)),
        }
    }
}

/// Demographic fields for the OTP-less verification path. Name, gender,
/// date of birth, state and district are required; the rest optional.
#[derive(Debug, Clone, Default)]
pub struct DemographicsInput {
    pub name: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub state_code: Option<String>,
    pub district_code: Option<String>,
    pub address: Option<String>,
    pub pincode: Option<String>,
    pub mobile: Option<String>,
    pub photo: Option<String>,
}

pub struct CreateWithAadhaar {
    flow: StepFlow<AadhaarCreateMemory>,
    provider: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    config: AadhaarCreateConfig,
    disclaimers: DisclaimerSet,
}

fn registry() -> Result<StepRegistry<AadhaarCreateMemory>, FlowError> {
    StepRegistry::builder()
        .step(StepDefinition::new(steps::ENTER_AADHAAR))
        .step(StepDefinition::new(steps::VERIFY_AADHAAR_WITH_OTP))
        .step(StepDefinition::new(steps::VERIFY_AADHAAR_WITH_DEMOGRAPHICS))
        .step(
            StepDefinition::new(steps::HANDLE_EXISTING_IDENTITY).on_enter(
                |ctx: &StepContext<AadhaarCreateMemory>| {
                // A brand new identity has nothing to choose; skip ahead.
                let memory = ctx.snapshot();
                    if memory.identity.as_ref().is_some_and(|i| i.is_new) {
                        ctx.go_to(steps::LINK_MOBILE)?;
                    }
                    Ok(())
                },
            ),
        )
        .step(StepDefinition::new(steps::LINK_MOBILE).on_enter(
            |ctx: &StepContext<AadhaarCreateMemory>| {
            // The Aadhaar-linked mobile may already be the one the user
            // entered; linking it again would be a wasted OTP round.
            let memory = ctx.snapshot();
            let entered = normalize_mobile(&memory.mobile_number);
            if memory
                .identity
                .as_ref()
                .is_some_and(|i| !entered.is_empty() && i.mobile == entered)
            {
                ctx.go_to(steps::CHOOSE_IDENTITY_ADDRESS)?;
            }
            Ok(())
            },
        ))
        .step(StepDefinition::new(steps::VERIFY_MOBILE))
        .step(StepDefinition::new(steps::CHOOSE_IDENTITY_ADDRESS))
        .step(StepDefinition::new(steps::SHOW_PROFILE))
        .build()
}

impl CreateWithAadhaar {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
        config: AadhaarCreateConfig,
    ) -> Result<Self, WizardError> {
        let flow = StepFlow::new(registry()?, AadhaarCreateMemory::default())?;
        Ok(Self {
            flow,
            provider,
            notifier,
            config,
            disclaimers: DisclaimerSet::new(DISCLAIMER_COUNT),
        })
    }

    // ---- inputs -----------------------------------------------------

    /// Stores the primary id, keeping only digits (the input field strips
    /// everything else as the user types).
    pub fn set_aadhaar_number(&self, raw: &str) {
        let digits = sanitize_digits(raw);
        self.flow.update_memory(|m| m.aadhaar_number = digits);
    }

    pub fn set_mobile_number(&self, raw: &str) {
        let raw = raw.to_string();
        self.flow.update_memory(|m| m.mobile_number = raw);
    }

    pub fn set_beneficiary_name(&self, name: &str) {
        let name = name.to_string();
        self.flow.update_memory(|m| m.beneficiary_name = name);
    }

    pub fn accept_disclaimer(&mut self, index: usize) -> bool {
        self.disclaimers.accept(index)
    }

    pub fn accept_all_disclaimers(&mut self) {
        self.disclaimers.accept_all();
    }

    // ---- enter-aadhaar ----------------------------------------------

    /// Requests an OTP bound to the primary id and advances to OTP
    /// verification.
    pub async fn submit_aadhaar(&self) -> Result<(), WizardError> {
        self.expect_step(steps::ENTER_AADHAAR, "submit_aadhaar")?;
        self.require_submission_enabled()?;
        let memory = self.flow.snapshot();
        validate_primary_id(&memory.aadhaar_number)?;

        let _guard = self.flow.begin_request()?;
        match self
            .provider
            .send_primary_otp(SendPrimaryOtpRequest {
                primary_id: memory.aadhaar_number.clone(),
                transaction_id: None,
            })
            .await
        {
            Ok(resp) => {
                self.apply(|m| m.transaction.set(&resp.transaction_id))?;
                self.notifier.success(&resp.detail);
                self.flow.go_to(steps::VERIFY_AADHAAR_WITH_OTP)?;
                Ok(())
            }
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    /// Alternate path: skip OTP and verify with demographics. Offered
    /// only when the facility supports it; needs no transaction id.
    pub fn choose_demographics_path(&self) -> Result<(), WizardError> {
        self.expect_step(steps::ENTER_AADHAAR, "choose_demographics_path")?;
        if !self.config.demographics_enabled {
            return Err(WizardError::DemographicsUnavailable);
        }
        self.require_submission_enabled()?;
        validate_primary_id(&self.flow.snapshot().aadhaar_number)?;
        self.apply(|m| m.transaction.clear())?;
        self.flow.go_to(steps::VERIFY_AADHAAR_WITH_DEMOGRAPHICS)?;
        Ok(())
    }

    // ---- verify-aadhaar-with-otp ------------------------------------

    /// Verifies the Aadhaar OTP together with the mobile number. Success
    /// yields an identity record (new or existing) and a fresh
    /// transaction id.
    pub async fn submit_otp(&self, otp: &str) -> Result<(), WizardError> {
        self.expect_step(steps::VERIFY_AADHAAR_WITH_OTP, "submit_otp")?;
        validate_otp(otp)?;
        let memory = self.flow.snapshot();
        let mobile = validate_mobile(&memory.mobile_number)?;
        let txn = memory.transaction.require()?;

        let _guard = self.flow.begin_request()?;
        match self
            .provider
            .verify_primary_otp(VerifyPrimaryOtpRequest {
                otp: otp.to_string(),
                transaction_id: txn.clone(),
                mobile,
            })
            .await
        {
            Ok(resp) => {
                // A resend may have replaced the transaction while this
                // verify was in flight; its answer is then meaningless.
                self.flow.snapshot().transaction.ensure_current(&txn)?;
                let mut identity = resp.identity.clone();
                identity.is_new = resp.is_new;
                self.apply(|m| {
                    m.transaction.set(&resp.transaction_id);
                    m.identity = Some(identity);
                    m.resend_otp.reset();
                })?;
                self.notifier.success(&resp.detail);
                self.flow.go_to(steps::HANDLE_EXISTING_IDENTITY)?;
                Ok(())
            }
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    /// Re-requests an OTP for the same primary id. Bounded: the check
    /// runs before the provider is touched, and a failed resend disables
    /// the affordance outright.
    pub async fn resend_otp(&self) -> Result<(), WizardError> {
        self.expect_step(steps::VERIFY_AADHAAR_WITH_OTP, "resend_otp")?;
        let memory = self.flow.snapshot();
        memory.resend_otp.check(&self.config.retry)?;

        let _guard = self.flow.begin_request()?;
        match self
            .provider
            .send_primary_otp(SendPrimaryOtpRequest {
                primary_id: memory.aadhaar_number.clone(),
                transaction_id: None,
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
            Err(e) => {
                self.apply(|m| m.resend_otp.exhaust())?;
                Err(self.provider_failure(e))
            }
        }
    }

    /// Whether the resend affordance should still be shown.
    pub fn can_resend_otp(&self) -> bool {
        self.flow.snapshot().resend_otp.can_resend(&self.config.retry)
    }

    // ---- verify-aadhaar-with-demographics ---------------------------

    /// OTP-less verification with name/gender/dob/state/district. An
    /// empty transaction id in the response means the identity is fully
    /// resolved and the flow finishes immediately.
    pub async fn submit_demographics(
        &self,
        input: DemographicsInput,
    ) -> Result<Option<IdentityRecord>, WizardError> {
        self.expect_step(
            steps::VERIFY_AADHAAR_WITH_DEMOGRAPHICS,
            "submit_demographics",
        )?;
        if input.name.is_empty() {
            return Err(DomainError::MissingField("name").into());
        }
        let gender = input.gender.ok_or(DomainError::MissingField("gender"))?;
        let date_of_birth = input
            .date_of_birth
            .ok_or(DomainError::MissingField("date_of_birth"))?;
        let state_code = input
            .state_code
            .ok_or(DomainError::MissingField("state_code"))?;
        let district_code = input
            .district_code
            .ok_or(DomainError::MissingField("district_code"))?;

        let memory = self.flow.snapshot();
        let transaction_id = if memory.transaction.is_empty() {
            None
        } else {
            Some(memory.transaction.value().to_string())
        };

        let _guard = self.flow.begin_request()?;
        match self
            .provider
            .verify_demographics(VerifyDemographicsRequest {
                transaction_id,
                primary_id: memory.aadhaar_number.clone(),
                name: input.name,
                gender,
                date_of_birth,
                state_code,
                district_code,
                address: input.address,
                pincode: input.pincode,
                mobile: input.mobile,
                photo: input.photo,
            })
            .await
        {
            Ok(resp) => {
                self.apply(|m| {
                    m.transaction.set(&resp.transaction_id);
                    m.identity = Some(resp.identity.clone());
                })?;
                self.notifier.success("demographics verified");
                if resp.transaction_id.is_empty() {
                    // Fully resolved: nothing left to link or choose.
                    return self.finish(resp.identity);
                }
                self.flow.go_to(steps::HANDLE_EXISTING_IDENTITY)?;
                Ok(None)
            }
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    /// State options for the demographics form.
    pub async fn list_states(&self) -> Result<Vec<StateEntry>, WizardError> {
        match self.provider.list_states().await {
            Ok(states) => Ok(states),
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    /// District options for the chosen state.
    pub async fn list_districts(
        &self,
        state_code: &str,
    ) -> Result<Vec<DistrictEntry>, WizardError> {
        match self.provider.list_districts(state_code).await {
            Ok(districts) => Ok(districts),
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    // ---- handle-existing-identity -----------------------------------

    /// Binary choice for an existing identity: keep its address and stop
    /// here.
    pub fn use_existing_identity(&self) -> Result<Option<IdentityRecord>, WizardError> {
        self.expect_step(steps::HANDLE_EXISTING_IDENTITY, "use_existing_identity")?;
        let identity = self
            .flow
            .snapshot()
            .identity
            .ok_or(DomainError::MissingField("identity"))?;
        self.finish(identity)
    }

    /// ... or enroll a new address for it.
    pub fn create_new_address(&self) -> Result<(), WizardError> {
        self.expect_step(steps::HANDLE_EXISTING_IDENTITY, "create_new_address")?;
        self.flow.go_to(steps::LINK_MOBILE)?;
        Ok(())
    }

    // ---- link-mobile / verify-mobile --------------------------------

    /// Requests an OTP to link the entered mobile to the identity.
    pub async fn submit_link_mobile(&self) -> Result<(), WizardError> {
        self.expect_step(steps::LINK_MOBILE, "submit_link_mobile")?;
        let memory = self.flow.snapshot();
        let mobile = validate_mobile(&memory.mobile_number)?;
        let txn = memory.transaction.require()?;

        let _guard = self.flow.begin_request()?;
        match self
            .provider
            .link_mobile(LinkMobileRequest {
                mobile,
                transaction_id: txn,
            })
            .await
        {
            Ok(resp) => {
                self.apply(|m| m.transaction.set(&resp.transaction_id))?;
                self.notifier.success(&resp.detail);
                self.flow.go_to(steps::VERIFY_MOBILE)?;
                Ok(())
            }
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    pub async fn submit_mobile_otp(&self, otp: &str) -> Result<(), WizardError> {
        self.expect_step(steps::VERIFY_MOBILE, "submit_mobile_otp")?;
        validate_otp(otp)?;
        let txn = self.flow.snapshot().transaction.require()?;

        let _guard = self.flow.begin_request()?;
        match self
            .provider
            .verify_mobile_otp(VerifyMobileOtpRequest {
                otp: otp.to_string(),
                transaction_id: txn.clone(),
            })
            .await
        {
            Ok(resp) => {
                self.flow.snapshot().transaction.ensure_current(&txn)?;
                self.apply(|m| {
                    m.transaction.set(&resp.transaction_id);
                    m.resend_otp.reset();
                })?;
                self.notifier.success(&resp.detail);
                self.flow.go_to(steps::CHOOSE_IDENTITY_ADDRESS)?;
                Ok(())
            }
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    /// Resend for the mobile-linking OTP, same counted discipline.
    pub async fn resend_mobile_otp(&self) -> Result<(), WizardError> {
        self.expect_step(steps::VERIFY_MOBILE, "resend_mobile_otp")?;
        let memory = self.flow.snapshot();
        memory.resend_otp.check(&self.config.retry)?;
        let mobile = validate_mobile(&memory.mobile_number)?;
        let txn = memory.transaction.require()?;

        let _guard = self.flow.begin_request()?;
        match self
            .provider
            .link_mobile(LinkMobileRequest {
                mobile,
                transaction_id: txn,
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
            Err(e) => {
                self.apply(|m| m.resend_otp.exhaust())?;
                Err(self.provider_failure(e))
            }
        }
    }

    // ---- choose-identity-address ------------------------------------

    /// Fetches address suggestions for the current transaction. Called on
    /// entering the step and again whenever the transaction id changes.
    pub async fn fetch_address_suggestions(&self) -> Result<Vec<String>, WizardError> {
        self.expect_step(steps::CHOOSE_IDENTITY_ADDRESS, "fetch_address_suggestions")?;
        let txn = self.flow.snapshot().transaction.require()?;

        let _guard = self.flow.begin_request()?;
        match self
            .provider
            .suggest_addresses(SuggestAddressesRequest {
                transaction_id: txn,
            })
            .await
        {
            Ok(resp) => {
                self.apply(|m| {
                    m.transaction.set(&resp.transaction_id);
                    m.suggestions = resp.suggestions.clone();
                })?;
                Ok(resp.suggestions)
            }
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    /// Enrolls the chosen address and finishes the wizard.
    pub async fn submit_address(
        &self,
        address: &str,
    ) -> Result<Option<IdentityRecord>, WizardError> {
        self.expect_step(steps::CHOOSE_IDENTITY_ADDRESS, "submit_address")?;
        validate_identity_address(address)?;
        let txn = self.flow.snapshot().transaction.require()?;

        let _guard = self.flow.begin_request()?;
        match self
            .provider
            .enroll_address(EnrollAddressRequest {
                address: address.to_string(),
                transaction_id: txn,
            })
            .await
        {
            Ok(resp) => {
                self.apply(|m| {
                    m.transaction.set(&resp.transaction_id);
                    m.identity = Some(resp.identity.clone());
                })?;
                self.notifier.success("identity address created");
                self.finish(resp.identity)
            }
            Err(e) => Err(self.provider_failure(e)),
        }
    }

    // ---- shared -----------------------------------------------------

    pub fn current_step(&self) -> String {
        self.flow.current_step()
    }

    pub fn memory(&self) -> AadhaarCreateMemory {
        self.flow.snapshot()
    }

    pub fn events(&self) -> Vec<FlowEvent> {
        self.flow.events()
    }

    pub fn is_completed(&self) -> bool {
        self.flow.is_completed()
    }

    /// Dismisses the wizard; in-flight responses will be dropped.
    pub fn close(&self) {
        self.flow.close();
    }

    fn finish(&self, identity: IdentityRecord) -> Result<Option<IdentityRecord>, WizardError> {
        self.flow.go_to(steps::SHOW_PROFILE)?;
        self.flow.complete();
        debug!(external_id = %identity.external_id, "aadhaar-create flow finished");
        Ok(Some(identity))
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

    fn require_submission_enabled(&self) -> Result<(), WizardError> {
        if !self.disclaimers.all_accepted() {
            return Err(WizardError::DisclaimersNotAccepted);
        }
        if self.flow.snapshot().beneficiary_name.is_empty() {
            return Err(WizardError::MissingBeneficiaryName);
        }
        Ok(())
    }

    fn apply<F>(&self, f: F) -> Result<(), WizardError>
    where
        F: FnOnce(&mut AadhaarCreateMemory),
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
