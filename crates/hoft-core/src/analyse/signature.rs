//! Analysis against the full declared signature.
//!
//! Dispatch order is fixed, so fail-fast always stops at the earliest
//! failure and fail-slow lists are deterministic:
//!
//! 1. positional slots, in declaration order
//! 2. keyword slots, sorted by name
//! 3. the fallback validator for everything not yet handled, sorted by name
//! 4. the strictness check
//!
//! A parameter is "handled" once any of the first three steps dispatched it.

use std::collections::HashSet;

use hoft_types::{ArgSpec, BoundArgs, CallArgs, CalledWith, NoDefaultError, Signature, Value};
use tracing::trace;

use crate::aggregate::Aggregator;
use crate::errors::{
    AnalysisError, ArgsNotAnalysedError, ErrorRecord, KeywordError, NotAnalysedError,
    PositionalError,
};
use crate::validator::{Failure, FallbackFn, SigKeywordFn, SigPositionalFn, Slot, Validator};

/// Configured validators for one signature analysis.
#[derive(Debug, Clone, Copy)]
pub struct SigSlots<'a> {
    pub positional: &'a [Slot<SigPositionalFn>],
    pub keyword: &'a [(String, Slot<SigKeywordFn>)],
    pub fallback: Option<&'a Validator<FallbackFn>>,
}

/// Positional slots matched to declared parameters by index.
///
/// Truncated to the shorter of slots and actual positional values. An
/// `IGNORE` slot neither runs nor marks its parameter handled. A slot that
/// lines up with a surplus value is dispatched under the variadic name and
/// leaves the catch-all itself unhandled.
pub fn parse_sig_positional_inputs(
    slots: &[Slot<SigPositionalFn>],
    args: &[Value],
    spec: &ArgSpec,
    handled: &mut HashSet<String>,
    agg: &mut Aggregator<'_>,
) -> Result<(), AnalysisError> {
    for (index, (slot, value)) in slots.iter().zip(args).enumerate() {
        let Some(validator) = slot.validator() else {
            continue;
        };
        let name = match spec.args().get(index) {
            Some(name) => {
                if !handled.insert(name.clone()) {
                    continue;
                }
                name.as_str()
            }
            None => match spec.varargs() {
                Some(varargs) => varargs,
                None => continue,
            },
        };
        trace!(name, index, validator = ?validator.name(), "positional validator");

        if let Err(error) = (validator.func())(name, index, value) {
            agg.record(ErrorRecord::Positional(PositionalError {
                error: Failure::from(error),
                name: Some(name.to_string()),
                index,
                value: value.clone(),
                func_name: validator.name().map(str::to_string),
                func: validator.id(),
            }))?;
        }
    }
    Ok(())
}

/// Keyword slots, sorted by name.
///
/// The validator sees what the caller supplied for the parameter by keyword,
/// or `NOVALUE`, plus the declared default separately. A required parameter
/// supplied by position is seen with that value.
/// `IGNORE` slots still mark their parameter handled.
pub fn parse_sig_keyword_inputs(
    slots: &[(String, Slot<SigKeywordFn>)],
    call: &CallArgs,
    spec: &ArgSpec,
    handled: &mut HashSet<String>,
    agg: &mut Aggregator<'_>,
) -> Result<(), AnalysisError> {
    let mut ordered: Vec<_> = slots.iter().collect();
    ordered.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (name, slot) in ordered {
        if !handled.insert(name.clone()) {
            continue;
        }
        let Some(validator) = slot.validator() else {
            continue;
        };

        let default_value = match spec.default_value(name) {
            Ok(value) => Some(value),
            Err(_) if spec.is_required(name) => None,
            Err(e) => return Err(e.into()),
        };
        let index = spec.index_of(name).ok_or_else(|| NoDefaultError::new(name))?;
        let positional = default_value
            .is_none()
            .then(|| call.positional.get(index))
            .flatten();
        let called_with = CalledWith::from(call.keyword(name).or(positional).cloned());
        trace!(name = %name, index, no_value = called_with.is_no_value(), "keyword validator");

        if let Err(error) = (validator.func())(name, index, &called_with, default_value) {
            agg.record(ErrorRecord::Keyword(KeywordError {
                error: Failure::from(error),
                name: name.clone(),
                value: called_with,
                default_value: default_value.cloned(),
                func_name: validator.name().map(str::to_string),
                func: validator.id(),
            }))?;
        }
    }
    Ok(())
}

/// Fallback validator for every bound parameter nothing has handled yet.
///
/// Unlike keyword validators, the fallback sees the bound value, which is
/// already the default when the caller omitted the parameter.
pub fn parse_sig_remaining_inputs(
    fallback: &Validator<FallbackFn>,
    spec: &ArgSpec,
    sig: &Signature,
    bound: &BoundArgs,
    handled: &mut HashSet<String>,
    agg: &mut Aggregator<'_>,
) -> Result<(), AnalysisError> {
    for (name, value) in bound.iter() {
        if !handled.insert(name.to_string()) {
            continue;
        }
        trace!(name, validator = ?fallback.name(), "fallback validator");

        if let Err(error) = (fallback.func())(name, value, sig) {
            let error = Failure::from(error);
            let func_name = fallback.name().map(str::to_string);
            let record = match sig.position(name) {
                Some(index) => ErrorRecord::Positional(PositionalError {
                    error,
                    name: Some(name.to_string()),
                    index,
                    value: value.clone(),
                    func_name,
                    func: fallback.id(),
                }),
                None => ErrorRecord::Keyword(KeywordError {
                    error,
                    name: name.to_string(),
                    value: CalledWith::Value(value.clone()),
                    default_value: declared_default(spec, name),
                    func_name,
                    func: fallback.id(),
                }),
            };
            agg.record(record)?;
        }
    }
    Ok(())
}

/// Declared default of a non-required parameter; catch-alls default to empty.
fn declared_default(spec: &ArgSpec, name: &str) -> Option<Value> {
    if let Ok(value) = spec.default_value(name) {
        Some(value.clone())
    } else if spec.varargs() == Some(name) {
        Some(Value::empty_array())
    } else if spec.keywords() == Some(name) {
        Some(Value::empty_object())
    } else {
        None
    }
}

/// Record one aggregate error naming every bound parameter left unhandled.
pub fn check_strict(
    spec: &ArgSpec,
    bound: &BoundArgs,
    handled: &HashSet<String>,
    agg: &mut Aggregator<'_>,
) -> Result<(), AnalysisError> {
    let names: Vec<String> = bound
        .names()
        .filter(|name| !handled.contains(*name))
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Ok(());
    }

    let error: Failure = std::sync::Arc::new(ArgsNotAnalysedError::new(names.clone()));
    agg.record(ErrorRecord::NotAnalysed(NotAnalysedError {
        error,
        names,
        argspec: spec.clone(),
        callargs: bound.clone(),
    }))
}

/// Full signature analysis of one call.
pub fn parse_all_sig_args(
    slots: SigSlots<'_>,
    call: &CallArgs,
    spec: &ArgSpec,
    bound: &BoundArgs,
    strict: bool,
    agg: &mut Aggregator<'_>,
) -> Result<(), AnalysisError> {
    let mut handled = HashSet::new();

    parse_sig_positional_inputs(slots.positional, &call.positional, spec, &mut handled, agg)?;
    parse_sig_keyword_inputs(slots.keyword, call, spec, &mut handled, agg)?;

    if let Some(fallback) = slots.fallback {
        let sig = spec.signature();
        parse_sig_remaining_inputs(fallback, spec, &sig, bound, &mut handled, agg)?;
    }

    if strict {
        check_strict(spec, bound, &handled, agg)?;
    }
    Ok(())
}
