//! healthid-rust: guided wizards for creating and linking national
//! health identities.
//!
//! The workspace splits into four layers, re-exported here for
//! convenience:
//! - `healthid_domain`: records, id classification, local validation.
//! - `healthid_core`: the generic step-flow engine.
//! - `healthid_providers`: the abstract identity-provider collaborator
//!   plus a scriptable mock.
//! - `healthid_flows`: the concrete wizards built on top.

pub use healthid_core as core;
pub use healthid_domain as domain;
pub use healthid_flows as flows;
pub use healthid_providers as providers;
