//! hoft-types: pure data types for hoft.
//!
//! This crate provides:
//!
//! - **Value**: dynamically typed argument values, and [`CalledWith`] /
//!   [`NOVALUE`] for "the caller supplied nothing"
//! - **CallArgs**: the actual positional and keyword arguments of one call
//! - **ArgSpec**: the declared parameters a callable publishes about itself,
//!   plus binding a call onto them
//! - **Signature**: the classified view of an `ArgSpec`

pub mod argspec;
pub mod call;
pub mod error;
pub mod value;

pub use argspec::{ArgSpec, ArgSpecBuilder, BoundArgs, Signature};
pub use call::CallArgs;
pub use error::{BindError, NoDefaultError, SpecError};
pub use value::{CalledWith, NOVALUE, Value};
