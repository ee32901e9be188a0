//! Wrapper factories.
//!
//! [`AnalyseIn`] and [`AnalyseSig`] capture validator assignments and policy
//! once, then [`wrap`](AnalyseIn::wrap) a target into an [`Analysed`]
//! callable. Every call runs the analysis and, unless an escalation aborted
//! it, forwards the caller's untouched arguments to the target.
//!
//! ```ignore
//! let checked = AnalyseIn::new()
//!     .arg(Validator::positional(validate_a))
//!     .arg(IGNORE)
//!     .kwarg("bar", Validator::keyword(validate_bar))
//!     .fail_fast(true)
//!     .wrap(Function::new("f", spec, body));
//!
//! let out = checked.call(&CallArgs::positional([10, 20]))?;
//! ```

use std::sync::Arc;

use hoft_types::{ArgSpec, CallArgs};
use tracing::{debug, warn};

use crate::aggregate::{Aggregator, ErrorHandler};
use crate::analyse::{SigSlots, parse_all_in_args, parse_all_sig_args};
use crate::config::{Policy, RESERVED_IN, RESERVED_SIG};
use crate::errors::{AnalysisError, ErrorRecord};
use crate::sigs::{Introspect, Target};
use crate::validator::{
    FallbackFn, KeywordFn, PositionalFn, SigKeywordFn, SigPositionalFn, Slot, Validator,
};

/// One analysis strategy, run against a call before the target sees it.
pub trait Analyse: Send + Sync {
    /// Validate `call` against `spec`.
    ///
    /// `Ok` carries the records a suppressing error handler let through;
    /// it is empty for a clean call.
    fn analyse(&self, spec: &ArgSpec, call: &CallArgs) -> Result<Vec<ErrorRecord>, AnalysisError>;
}

/// Insert or replace a keyword slot, refusing reserved option names.
fn set_keyword<F: ?Sized>(
    slots: &mut Vec<(String, Slot<F>)>,
    reserved: &[&str],
    name: String,
    slot: Slot<F>,
) {
    if reserved.contains(&name.as_str()) {
        warn!(name = %name, "reserved option name cannot be a keyword validator, ignoring");
        return;
    }
    match slots.iter_mut().find(|(existing, _)| *existing == name) {
        Some(entry) => entry.1 = slot,
        None => slots.push((name, slot)),
    }
}

/// Validates the arguments a call actually supplied.
#[derive(Debug, Clone, Default)]
pub struct AnalyseIn {
    positional: Vec<Slot<PositionalFn>>,
    keyword: Vec<(String, Slot<KeywordFn>)>,
    policy: Policy,
    on_error: Option<ErrorHandler>,
}

impl AnalyseIn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next positional slot: a validator or `IGNORE`.
    pub fn arg(mut self, slot: impl Into<Slot<PositionalFn>>) -> Self {
        self.positional.push(slot.into());
        self
    }

    /// Keyword slot for `name`. Reserved option names are refused.
    pub fn kwarg(mut self, name: impl Into<String>, slot: impl Into<Slot<KeywordFn>>) -> Self {
        set_keyword(&mut self.keyword, RESERVED_IN, name.into(), slot.into());
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.policy.fail_fast = fail_fast;
        self
    }

    pub fn on_error(mut self, handler: ErrorHandler) -> Self {
        self.on_error = Some(handler);
        self
    }

    /// Take the fail-fast flag from a policy. `strict` does not apply here.
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn wrap<T: Target>(self, target: T) -> Analysed<T, Self> {
        Analysed::new(target, self)
    }
}

impl Analyse for AnalyseIn {
    fn analyse(&self, spec: &ArgSpec, call: &CallArgs) -> Result<Vec<ErrorRecord>, AnalysisError> {
        let mut agg = Aggregator::new(self.on_error.as_ref(), self.policy.fail_fast);
        parse_all_in_args(&self.positional, &self.keyword, call, spec, &mut agg)?;
        agg.conclude()
    }
}

/// Validates a call against the target's full declared signature.
#[derive(Debug, Clone, Default)]
pub struct AnalyseSig {
    positional: Vec<Slot<SigPositionalFn>>,
    keyword: Vec<(String, Slot<SigKeywordFn>)>,
    fallback: Option<Validator<FallbackFn>>,
    policy: Policy,
    on_error: Option<ErrorHandler>,
}

impl AnalyseSig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next positional slot, matched to the declared parameter at the same index.
    pub fn arg(mut self, slot: impl Into<Slot<SigPositionalFn>>) -> Self {
        self.positional.push(slot.into());
        self
    }

    /// Keyword slot for the declared parameter `name`.
    pub fn kwarg(mut self, name: impl Into<String>, slot: impl Into<Slot<SigKeywordFn>>) -> Self {
        set_keyword(&mut self.keyword, RESERVED_SIG, name.into(), slot.into());
        self
    }

    /// Validator for every parameter no positional or keyword slot handled.
    pub fn fallback(mut self, validator: Validator<FallbackFn>) -> Self {
        self.fallback = Some(validator);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.policy.strict = strict;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.policy.fail_fast = fail_fast;
        self
    }

    pub fn on_error(mut self, handler: ErrorHandler) -> Self {
        self.on_error = Some(handler);
        self
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn wrap<T: Target>(self, target: T) -> Analysed<T, Self> {
        Analysed::new(target, self)
    }
}

impl Analyse for AnalyseSig {
    fn analyse(&self, spec: &ArgSpec, call: &CallArgs) -> Result<Vec<ErrorRecord>, AnalysisError> {
        let bound = spec.bind(call)?;
        let slots = SigSlots {
            positional: &self.positional,
            keyword: &self.keyword,
            fallback: self.fallback.as_ref(),
        };
        let mut agg = Aggregator::new(self.on_error.as_ref(), self.policy.fail_fast);
        parse_all_sig_args(slots, call, spec, &bound, self.policy.strict, &mut agg)?;
        agg.conclude()
    }
}

/// A target wrapped with an analysis strategy.
///
/// The configuration is shared read-only, so one `Analysed` can be called
/// from several threads when the target allows it.
#[derive(Debug)]
pub struct Analysed<T, A> {
    target: T,
    analyser: Arc<A>,
}

impl<T: Clone, A> Clone for Analysed<T, A> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            analyser: Arc::clone(&self.analyser),
        }
    }
}

impl<T: Target, A: Analyse> Analysed<T, A> {
    pub fn new(target: T, analyser: A) -> Self {
        Self {
            target,
            analyser: Arc::new(analyser),
        }
    }

    /// Run the analysis only, without calling the target.
    pub fn analyse(&self, args: &CallArgs) -> Result<Vec<ErrorRecord>, AnalysisError> {
        self.analyser.analyse(self.target.argspec(), args)
    }

    /// Analyse, then invoke the target with `args` unchanged.
    pub fn call(&self, args: &CallArgs) -> Result<T::Output, AnalysisError> {
        debug!(function = %self.target.name(), args = args.len(), "analysing call");
        let suppressed = self.analyse(args)?;
        if !suppressed.is_empty() {
            debug!(errors = suppressed.len(), "error handler let the call through");
        }
        Ok(self.target.call(args))
    }

    pub fn target(&self) -> &T {
        &self.target
    }
}

impl<T: Target, A> Introspect for Analysed<T, A> {
    fn argspec(&self) -> &ArgSpec {
        self.target.argspec()
    }

    fn name(&self) -> &str {
        self.target.name()
    }
}

impl<T: Target, A: Analyse> Target for Analysed<T, A> {
    type Output = Result<T::Output, AnalysisError>;

    fn call(&self, args: &CallArgs) -> Self::Output {
        Analysed::<T, A>::call(self, args)
    }
}
