//! Analysis of the arguments a call actually supplied.
//!
//! Declared parameters the caller omitted are never looked at, and neither
//! are their defaults.

use hoft_types::{ArgSpec, CallArgs, CalledWith, Value};
use tracing::trace;

use crate::aggregate::Aggregator;
use crate::errors::{AnalysisError, ErrorRecord, KeywordError, PositionalError};
use crate::validator::{Failure, KeywordFn, PositionalFn, Slot};

/// Run positional validators against the call's positional values.
///
/// Slots and values are zipped, so whichever list is longer is truncated:
/// extra slots never run and extra values are never validated.
pub fn parse_positional_inputs(
    slots: &[Slot<PositionalFn>],
    args: &[Value],
    spec: &ArgSpec,
    agg: &mut Aggregator<'_>,
) -> Result<(), AnalysisError> {
    for (index, (slot, value)) in slots.iter().zip(args).enumerate() {
        let Some(validator) = slot.validator() else {
            continue;
        };
        trace!(index, validator = ?validator.name(), "positional validator");

        if let Err(error) = (validator.func())(value, index) {
            agg.record(ErrorRecord::Positional(PositionalError {
                error: Failure::from(error),
                name: spec.args().get(index).cloned(),
                index,
                value: value.clone(),
                func_name: validator.name().map(str::to_string),
                func: validator.id(),
            }))?;
        }
    }
    Ok(())
}

/// Run keyword validators against the call's keyword values.
///
/// An absent keyword is passed as `Value::Null` with `present == false`.
pub fn parse_keyword_inputs(
    slots: &[(String, Slot<KeywordFn>)],
    call: &CallArgs,
    spec: &ArgSpec,
    agg: &mut Aggregator<'_>,
) -> Result<(), AnalysisError> {
    for (name, slot) in slots {
        let Some(validator) = slot.validator() else {
            continue;
        };
        let value = call.keyword(name);
        let present = value.is_some();
        trace!(name = %name, present, validator = ?validator.name(), "keyword validator");

        if let Err(error) = (validator.func())(name, value.unwrap_or(&Value::Null), present) {
            agg.record(ErrorRecord::Keyword(KeywordError {
                error: Failure::from(error),
                name: name.clone(),
                value: CalledWith::from(value.cloned()),
                default_value: spec.default_value(name).ok().cloned(),
                func_name: validator.name().map(str::to_string),
                func: validator.id(),
            }))?;
        }
    }
    Ok(())
}

/// Positional slots first, then keyword slots in configuration order.
pub fn parse_all_in_args(
    positional: &[Slot<PositionalFn>],
    keyword: &[(String, Slot<KeywordFn>)],
    call: &CallArgs,
    spec: &ArgSpec,
    agg: &mut Aggregator<'_>,
) -> Result<(), AnalysisError> {
    parse_positional_inputs(positional, &call.positional, spec, agg)?;
    parse_keyword_inputs(keyword, call, spec, agg)
}
