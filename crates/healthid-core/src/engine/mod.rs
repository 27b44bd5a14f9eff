//! Engine module: the `StepFlow` state machine and the `StepContext`
//! handle injected into step logic.

pub mod context;
pub mod core;

pub use context::StepContext;
pub use core::{RequestGuard, StepFlow};
