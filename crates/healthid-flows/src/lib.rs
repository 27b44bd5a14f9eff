//! healthid-flows: wizard instantiations of the step-flow engine.
//!
//! Three ways to link an identity: create it from the primary national id
//! (OTP or demographics verified), link an existing one via OTP login, or
//! create one directly from a scanned QR payload.

pub mod create_with_aadhaar;
pub mod disclaimer;
pub mod errors;
pub mod link_with_otp;
pub mod link_with_qr;
pub mod notify;

pub use create_with_aadhaar::{
    AadhaarCreateConfig, AadhaarCreateMemory, CreateWithAadhaar, DemographicsInput,
};
pub use disclaimer::DisclaimerSet;
pub use errors::WizardError;
pub use link_with_otp::{LinkWithOtp, OtpLinkConfig, OtpLinkMemory};
pub use link_with_qr::LinkWithQr;
pub use notify::{Notification, Notifier, NotifyLevel, RecordingNotifier, TracingNotifier};
