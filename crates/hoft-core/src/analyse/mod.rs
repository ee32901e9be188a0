//! The two argument analysers.
//!
//! - [`call_args`]: validates only what the caller actually passed
//! - [`signature`]: validates against the full declared signature, with
//!   a fallback validator and strict completeness checking
//!
//! Both push failures into an [`Aggregator`](crate::aggregate::Aggregator),
//! which owns the escalation policy.

pub mod call_args;
pub mod signature;

pub use call_args::parse_all_in_args;
pub use signature::{SigSlots, parse_all_sig_args};
