//! healthid-providers: the abstract identity-provider collaborator.
//!
//! The concrete wire format, transport and auth headers belong to the
//! excluded thin-client layer; this crate only fixes the operation shapes
//! the flows depend on, plus an in-memory scriptable implementation used
//! by tests and the demo binary.

pub mod errors;
pub mod mock;
pub mod provider;
pub mod types;

pub use errors::ProviderError;
pub use mock::{MockIdentityProvider, RecordedCall};
pub use provider::{ops, IdentityProvider};
pub use types::*;
