//! Test utilities for hoft.
//!
//! Provides recording validators: each [`Recorder`] hands out validators for
//! any dispatch path, remembers every call made to them, and either passes or
//! fails with a [`TestError`].
//!
//! ```ignore
//! let f_a = Recorder::failing("f_a", "a is wrong");
//! let wrapped = AnalyseIn::new().arg(f_a.positional()).wrap(target);
//! wrapped.call(&CallArgs::positional([10])).unwrap_err();
//! f_a.assert_called_once_with(Call::Positional { value: 10.into(), index: 0 });
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use hoft_core::{
    CalledWith, FallbackFn, KeywordFn, PositionalFn, SigKeywordFn, SigPositionalFn, Signature,
    Validator, ValidatorResult, Value,
};

/// Failure raised by a failing [`Recorder`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TestError(pub String);

/// One recorded validator invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Positional {
        value: Value,
        index: usize,
    },
    Keyword {
        name: String,
        value: Value,
        present: bool,
    },
    SigPositional {
        name: String,
        index: usize,
        value: Value,
    },
    SigKeyword {
        name: String,
        index: usize,
        called_with: CalledWith,
        default: Option<Value>,
    },
    Fallback {
        name: String,
        value: Value,
        signature: Signature,
    },
}

impl Call {
    /// Parameter name, when the dispatch path passes one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Call::Positional { .. } => None,
            Call::Keyword { name, .. }
            | Call::SigPositional { name, .. }
            | Call::SigKeyword { name, .. }
            | Call::Fallback { name, .. } => Some(name),
        }
    }
}

/// A named validator double that records its calls.
///
/// Clones share the same call log.
#[derive(Debug, Clone)]
pub struct Recorder {
    name: String,
    failure: Option<String>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    /// A recorder whose validators always pass.
    pub fn passing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure: None,
            calls: Arc::default(),
        }
    }

    /// A recorder whose validators always fail with `message`.
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::passing(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn record(&self, call: Call) -> ValidatorResult {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        match &self.failure {
            Some(message) => Err(Box::new(TestError(message.clone()))),
            None => Ok(()),
        }
    }

    pub fn positional(&self) -> Validator<PositionalFn> {
        let this = self.clone();
        Validator::positional(move |value, index| {
            this.record(Call::Positional {
                value: value.clone(),
                index,
            })
        })
        .named(&self.name)
    }

    pub fn keyword(&self) -> Validator<KeywordFn> {
        let this = self.clone();
        Validator::keyword(move |name, value, present| {
            this.record(Call::Keyword {
                name: name.to_string(),
                value: value.clone(),
                present,
            })
        })
        .named(&self.name)
    }

    pub fn sig_positional(&self) -> Validator<SigPositionalFn> {
        let this = self.clone();
        Validator::sig_positional(move |name, index, value| {
            this.record(Call::SigPositional {
                name: name.to_string(),
                index,
                value: value.clone(),
            })
        })
        .named(&self.name)
    }

    pub fn sig_keyword(&self) -> Validator<SigKeywordFn> {
        let this = self.clone();
        Validator::sig_keyword(move |name, index, called_with, default| {
            this.record(Call::SigKeyword {
                name: name.to_string(),
                index,
                called_with: called_with.clone(),
                default: default.cloned(),
            })
        })
        .named(&self.name)
    }

    pub fn fallback(&self) -> Validator<FallbackFn> {
        let this = self.clone();
        Validator::fallback(move |name, value, signature| {
            this.record(Call::Fallback {
                name: name.to_string(),
                value: value.clone(),
                signature: signature.clone(),
            })
        })
        .named(&self.name)
    }

    /// Every call so far, in invocation order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Names passed to the validators, in invocation order.
    pub fn called_names(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(Call::name)
            .map(str::to_string)
            .collect()
    }

    pub fn reset(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[track_caller]
    pub fn assert_called_once_with(&self, expected: Call) {
        let calls = self.calls();
        assert_eq!(calls, vec![expected], "{} calls", self.name);
    }

    #[track_caller]
    pub fn assert_not_called(&self) {
        let calls = self.calls();
        assert!(calls.is_empty(), "{} was called: {calls:?}", self.name);
    }
}

/// Assert the recorder saw exactly `expected`, in any order.
#[track_caller]
pub fn check_calls(recorder: &Recorder, expected: &[Call]) {
    let mut remaining = recorder.calls();
    for call in expected {
        match remaining.iter().position(|seen| seen == call) {
            Some(at) => {
                remaining.swap_remove(at);
            }
            None => panic!(
                "{} was never called with {call:?}; calls: {:?}",
                recorder.name(),
                recorder.calls()
            ),
        }
    }
    assert!(
        remaining.is_empty(),
        "{} had unexpected calls: {remaining:?}",
        recorder.name()
    );
}

/// Route `tracing` output to the test harness. Safe to call repeatedly.
///
/// Filter with `RUST_LOG`, e.g. `RUST_LOG=hoft_core=trace`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
