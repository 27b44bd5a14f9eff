//! healthid-core: step-flow engine for guided identity-linking wizards.
//!
//! One wizard run is one `StepFlow`: an ordered registry of named steps, a
//! single shared memory record, and a navigation cursor. Steps never talk
//! to each other directly; everything a flow has learned lives in the
//! memory record and survives every navigation.

pub mod bus;
pub mod engine;
pub mod errors;
pub mod event;
pub mod retry;
pub mod step;
pub mod txn;

pub use bus::{EventBus, Subscription};
pub use engine::{RequestGuard, StepContext, StepFlow};
pub use errors::FlowError;
pub use event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
pub use retry::{OtpRetryPolicy, RetryCounter};
pub use step::{StepDefinition, StepRegistry, StepRegistryBuilder};
pub use txn::TransactionThread;
