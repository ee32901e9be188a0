//! Error records and the errors a wrapped call can fail with.
//!
//! Every validator failure becomes an [`ErrorRecord`] appended to the
//! per-call list. When the list is escalated, the propagating
//! [`AnalysisError`] carries the failure and the whole list together.

use std::fmt;

use hoft_types::{ArgSpec, BindError, BoundArgs, CalledWith, NoDefaultError, Value};
use thiserror::Error;

use crate::validator::{Failure, ValidatorId};

/// A positional validator (or the fallback, for a required parameter) failed.
#[derive(Debug, Clone)]
pub struct PositionalError {
    /// What the validator raised.
    pub error: Failure,
    /// Declared parameter name, when the index maps to one.
    pub name: Option<String>,
    pub index: usize,
    /// The value the validator was given.
    pub value: Value,
    pub func_name: Option<String>,
    pub func: ValidatorId,
}

/// A keyword validator (or the fallback, for a non-required parameter) failed.
#[derive(Debug, Clone)]
pub struct KeywordError {
    pub error: Failure,
    pub name: String,
    /// The value the caller supplied, or `NOVALUE`.
    pub value: CalledWith,
    /// The declared default, if the parameter has one.
    pub default_value: Option<Value>,
    pub func_name: Option<String>,
    pub func: ValidatorId,
}

/// Strict mode found declared parameters nothing analysed.
#[derive(Debug, Clone)]
pub struct NotAnalysedError {
    /// Always an [`ArgsNotAnalysedError`].
    pub error: Failure,
    /// Unanalysed parameter names, sorted.
    pub names: Vec<String>,
    pub argspec: ArgSpec,
    /// The full binding of the call, for context.
    pub callargs: BoundArgs,
}

/// One entry of the per-call error list.
#[derive(Debug, Clone)]
pub enum ErrorRecord {
    Positional(PositionalError),
    Keyword(KeywordError),
    NotAnalysed(NotAnalysedError),
}

impl ErrorRecord {
    /// The underlying failure.
    pub fn error(&self) -> &Failure {
        match self {
            ErrorRecord::Positional(e) => &e.error,
            ErrorRecord::Keyword(e) => &e.error,
            ErrorRecord::NotAnalysed(e) => &e.error,
        }
    }

    /// Parameter name, if the record concerns a single parameter.
    pub fn name(&self) -> Option<&str> {
        match self {
            ErrorRecord::Positional(e) => e.name.as_deref(),
            ErrorRecord::Keyword(e) => Some(&e.name),
            ErrorRecord::NotAnalysed(_) => None,
        }
    }

    /// Which validator failed. Strictness records have none.
    pub fn func(&self) -> Option<ValidatorId> {
        match self {
            ErrorRecord::Positional(e) => Some(e.func),
            ErrorRecord::Keyword(e) => Some(e.func),
            ErrorRecord::NotAnalysed(_) => None,
        }
    }

    pub fn as_positional(&self) -> Option<&PositionalError> {
        match self {
            ErrorRecord::Positional(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&KeywordError> {
        match self {
            ErrorRecord::Keyword(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_not_analysed(&self) -> Option<&NotAnalysedError> {
        match self {
            ErrorRecord::NotAnalysed(e) => Some(e),
            _ => None,
        }
    }

    /// Recover the failure as the validator's own error type.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.error().downcast_ref::<E>()
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorRecord::Positional(e) => match &e.name {
                Some(name) => write!(f, "argument {} (index {}): {}", name, e.index, e.error),
                None => write!(f, "argument at index {}: {}", e.index, e.error),
            },
            ErrorRecord::Keyword(e) => write!(f, "keyword {}: {}", e.name, e.error),
            ErrorRecord::NotAnalysed(e) => write!(f, "{}", e.error),
        }
    }
}

/// One or more declared parameters were not analysed in strict mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("arguments not analysed: {}", names.join(", "))]
pub struct ArgsNotAnalysedError {
    /// Unanalysed names, sorted.
    pub names: Vec<String>,
}

impl ArgsNotAnalysedError {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

/// Why a wrapped call did not reach its target.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A validator failed and no handler intercepted it. `source` is the
    /// validator's own error.
    #[error("validation failed: {source}")]
    Rejected {
        source: Failure,
        errors: Vec<ErrorRecord>,
    },
    /// The configured error handler built a replacement error.
    #[error("validation failed: {source}")]
    Raised {
        source: Failure,
        errors: Vec<ErrorRecord>,
    },
    /// The configured error callback itself failed.
    #[error("error handler failed: {source}")]
    Handler {
        source: Failure,
        errors: Vec<ErrorRecord>,
    },
    /// A keyword validator names something that has no declared default.
    #[error(transparent)]
    NoDefault(#[from] NoDefaultError),
    /// The call does not fit the declared parameters.
    #[error("cannot bind call: {0}")]
    Bind(#[from] BindError),
}

impl AnalysisError {
    /// The ordered error list at the point of escalation.
    pub fn errors(&self) -> &[ErrorRecord] {
        match self {
            AnalysisError::Rejected { errors, .. }
            | AnalysisError::Raised { errors, .. }
            | AnalysisError::Handler { errors, .. } => errors,
            AnalysisError::NoDefault(_) | AnalysisError::Bind(_) => &[],
        }
    }

    /// The error that propagated in place of the call.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            AnalysisError::Rejected { source, .. }
            | AnalysisError::Raised { source, .. }
            | AnalysisError::Handler { source, .. } => Some(source),
            AnalysisError::NoDefault(_) | AnalysisError::Bind(_) => None,
        }
    }

    /// Recover the propagated failure as a concrete type.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.failure()?.downcast_ref::<E>()
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, AnalysisError::Rejected { .. })
    }
}
