//! hoft-core: per-parameter argument analysis for wrapped callables.
//!
//! This crate provides:
//!
//! - **Validators**: observational callables attached to parameters, or
//!   skipped with [`IGNORE`]
//! - **Call-argument analysis** ([`AnalyseIn`]): validates what a call
//!   actually supplied
//! - **Signature analysis** ([`AnalyseSig`]): validates against the full
//!   declared signature, with a fallback validator and strict mode
//! - **Aggregation**: collects [`ErrorRecord`]s and escalates them fail-fast
//!   or fail-slow, optionally through an [`ErrorHandler`]
//!
//! A wrapped target is only invoked once analysis did not propagate an
//! error, and always with the caller's original arguments.

pub mod aggregate;
pub mod analyse;
pub mod config;
pub mod decorators;
pub mod errors;
pub mod sigs;
pub mod validator;

pub use aggregate::{Aggregator, ErrorHandler, escalate};
pub use config::Policy;
pub use decorators::{Analyse, AnalyseIn, AnalyseSig, Analysed};
pub use errors::{
    AnalysisError, ArgsNotAnalysedError, ErrorRecord, KeywordError, NotAnalysedError,
    PositionalError,
};
pub use sigs::{Function, Introspect, Target, signature};
pub use validator::{
    BoxError, FallbackFn, Failure, IGNORE, Ignore, KeywordFn, PositionalFn, SigKeywordFn,
    SigPositionalFn, Slot, Validator, ValidatorId, ValidatorResult,
};

pub use hoft_types;
pub use hoft_types::{ArgSpec, BoundArgs, CallArgs, CalledWith, NOVALUE, Signature, Value};
