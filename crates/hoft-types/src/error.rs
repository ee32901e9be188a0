//! Errors raised while describing or binding a signature.

use thiserror::Error;

/// A default value was requested for a parameter that does not have one.
///
/// Raised for required parameters, variadic catch-alls, and names that are
/// not declared at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no default value for parameter: {name}")]
pub struct NoDefaultError {
    /// The parameter that was looked up.
    pub name: String,
}

impl NoDefaultError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An `ArgSpec` under construction is not a valid parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("duplicate parameter name: {0}")]
    DuplicateParameter(String),
    #[error("required parameter {name} follows a parameter with a default")]
    RequiredAfterDefault { name: String },
}

/// The actual arguments of a call do not fit the declared parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("takes {expected} positional arguments but {given} were given")]
    TooManyPositional { expected: usize, given: usize },
    #[error("got multiple values for argument: {0}")]
    MultipleValues(String),
    #[error("got an unexpected keyword argument: {0}")]
    UnexpectedKeyword(String),
    #[error("missing required arguments: {}", .0.join(", "))]
    MissingArguments(Vec<String>),
}
