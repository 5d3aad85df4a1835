//! Layout validation.
//!
//! Stateless validators that check computed layouts against the rules a block must satisfy
//! to be accessed safely, and the [`Orchestrator`] that runs them after a layout pass.
//!
//! - [`EntityValidator`]: layout declaration, block length, class height, base chain and
//!   identifiers
//! - [`MemberValidator`]: nullability, offsets, lengths, capacities and sequence numbers
//! - [`BlockValidator`]: bounds, alignment and overlap against a byte ownership map
//!
//! Every check returns [`CheckResult`], carrying at most one [`Violation`].

mod block;
mod config;
mod entity;
mod member;
mod orchestrator;

use crate::diagnostics::Violation;

pub use block::BlockValidator;
pub use config::ValidationConfig;
pub use entity::EntityValidator;
pub use member::MemberValidator;
pub use orchestrator::Orchestrator;

/// Outcome of a single check: the first violation found, if any
pub type CheckResult = std::result::Result<(), Violation>;
