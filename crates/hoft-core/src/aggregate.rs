//! Error aggregation and escalation.
//!
//! Validator failures are always recorded. The fail-fast policy only decides
//! *when* the list is escalated: right after the failure that was just
//! recorded, or once at the end of the pass using the first record.
//!
//! Escalation has three outcomes:
//!
//! 1. no handler: the original failure propagates ([`AnalysisError::Rejected`])
//! 2. [`ErrorHandler::Raise`]: the handler's replacement error propagates
//!    ([`AnalysisError::Raised`])
//! 3. [`ErrorHandler::Call`]: the callback runs; `Ok(())` suppresses the
//!    occurrence, `Err` propagates ([`AnalysisError::Handler`])

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::errors::{AnalysisError, ErrorRecord};
use crate::validator::{BoxError, Failure, ValidatorResult};

type RaiseFn = dyn Fn(&Failure, &[ErrorRecord]) -> BoxError + Send + Sync;
type CallFn = dyn Fn(&Failure, &[ErrorRecord]) -> ValidatorResult + Send + Sync;

/// Custom escalation for validation failures.
#[derive(Clone)]
pub enum ErrorHandler {
    /// Build a replacement error from `(failure, errors)` and propagate it.
    Raise(Arc<RaiseFn>),
    /// Run a callback with `(failure, errors)`; it propagates only by failing.
    Call(Arc<CallFn>),
}

impl ErrorHandler {
    pub fn raise<F>(ctor: F) -> Self
    where
        F: Fn(&Failure, &[ErrorRecord]) -> BoxError + Send + Sync + 'static,
    {
        ErrorHandler::Raise(Arc::new(ctor))
    }

    pub fn call<F>(callback: F) -> Self
    where
        F: Fn(&Failure, &[ErrorRecord]) -> ValidatorResult + Send + Sync + 'static,
    {
        ErrorHandler::Call(Arc::new(callback))
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorHandler::Raise(_) => f.write_str("ErrorHandler::Raise"),
            ErrorHandler::Call(_) => f.write_str("ErrorHandler::Call"),
        }
    }
}

/// Escalate `failure` with the list collected so far.
pub fn escalate(
    failure: &Failure,
    handler: Option<&ErrorHandler>,
    errors: &[ErrorRecord],
) -> Result<(), AnalysisError> {
    debug!(errors = errors.len(), handler = ?handler, "escalating validation failure");
    match handler {
        None => Err(AnalysisError::Rejected {
            source: Arc::clone(failure),
            errors: errors.to_vec(),
        }),
        Some(ErrorHandler::Raise(ctor)) => Err(AnalysisError::Raised {
            source: Failure::from(ctor(failure, errors)),
            errors: errors.to_vec(),
        }),
        Some(ErrorHandler::Call(callback)) => {
            callback(failure, errors).map_err(|e| AnalysisError::Handler {
                source: Failure::from(e),
                errors: errors.to_vec(),
            })
        }
    }
}

/// Per-call error list plus the escalation policy.
#[derive(Debug)]
pub struct Aggregator<'a> {
    handler: Option<&'a ErrorHandler>,
    fail_fast: bool,
    errors: Vec<ErrorRecord>,
}

impl<'a> Aggregator<'a> {
    pub fn new(handler: Option<&'a ErrorHandler>, fail_fast: bool) -> Self {
        Self {
            handler,
            fail_fast,
            errors: Vec::new(),
        }
    }

    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Append a record; in fail-fast mode escalate it right away.
    pub fn record(&mut self, record: ErrorRecord) -> Result<(), AnalysisError> {
        debug!(%record, fail_fast = self.fail_fast, "validator failed");
        let failure = Arc::clone(record.error());
        self.errors.push(record);
        if self.fail_fast {
            escalate(&failure, self.handler, &self.errors)
        } else {
            Ok(())
        }
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// End of pass. In fail-slow mode, escalate the first record once.
    ///
    /// Returns the list when nothing propagated.
    pub fn conclude(self) -> Result<Vec<ErrorRecord>, AnalysisError> {
        if !self.fail_fast {
            if let Some(first) = self.errors.first() {
                escalate(first.error(), self.handler, &self.errors)?;
            }
        }
        Ok(self.errors)
    }
}
