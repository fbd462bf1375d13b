//! Named authorization policies.

pub mod evaluator;
pub mod registry;

pub use evaluator::{Decision, DenyReason, PolicyEvaluator};
pub use registry::{ClaimRequirement, PolicyDefinition, PolicyRegistry};
