//! Signature analysis through the public wrapper.
//!
//! Most tests wrap `voo(a, b, c, d, e=1, f='2', g={3: 4}, **kwargs)` as
//! `AnalyseSig(f_a, IGNORE, f_c, c=IGNORE, d=IGNORE, f=f_f)` and call it as
//! `voo(11, 22, 33, 44, e=99)`.

use std::sync::{Arc, Mutex};

use hoft_core::{
    AnalyseSig, AnalysisError, ArgSpec, ArgsNotAnalysedError, CallArgs, CalledWith, ErrorHandler,
    ErrorRecord, Function, IGNORE, NOVALUE, Policy, Validator, Value,
};
use hoft_core::hoft_types::BindError;
use hoft_testutil::{Call, Recorder, TestError, check_calls, init_tracing};
use rstest::rstest;

fn g_default() -> Value {
    Value::Object(vec![("3".to_string(), Value::Int(4))])
}

fn voo_spec() -> ArgSpec {
    ArgSpec::builder()
        .arg("a")
        .arg("b")
        .arg("c")
        .arg("d")
        .arg_default("e", 1)
        .arg_default("f", "2")
        .arg_default("g", g_default())
        .keywords("kwargs")
        .build()
        .expect("valid spec")
}

fn voo() -> Function<impl Fn(&CallArgs) -> &'static str> {
    Function::new("voo", voo_spec(), |_: &CallArgs| "success")
}

fn call() -> CallArgs {
    CallArgs::positional([11, 22, 33, 44]).kwarg("e", 99)
}

/// The three explicitly configured validators.
struct Validators {
    f_a: Recorder,
    f_c: Recorder,
    f_f: Recorder,
}

impl Validators {
    fn passing() -> Self {
        Self {
            f_a: Recorder::passing("f_a"),
            f_c: Recorder::passing("f_c"),
            f_f: Recorder::passing("f_f"),
        }
    }

    fn failing() -> Self {
        Self {
            f_a: Recorder::failing("f_a", "a"),
            f_c: Recorder::failing("f_c", "c"),
            f_f: Recorder::failing("f_f", "f"),
        }
    }

    fn analyser(&self) -> AnalyseSig {
        AnalyseSig::new()
            .arg(self.f_a.sig_positional())
            .arg(IGNORE)
            .arg(self.f_c.sig_positional())
            .kwarg("c", IGNORE)
            .kwarg("d", IGNORE)
            .kwarg("f", self.f_f.sig_keyword())
    }

    fn assert_all_called(&self) {
        self.f_a.assert_called_once_with(Call::SigPositional {
            name: "a".into(),
            index: 0,
            value: Value::Int(11),
        });
        self.f_c.assert_called_once_with(Call::SigPositional {
            name: "c".into(),
            index: 2,
            value: Value::Int(33),
        });
        self.f_f.assert_called_once_with(Call::SigKeyword {
            name: "f".into(),
            index: 5,
            called_with: NOVALUE,
            default: Some(Value::from("2")),
        });
    }

    fn assert_only_a_called(&self) {
        assert_eq!(self.f_a.call_count(), 1);
        self.f_c.assert_not_called();
        self.f_f.assert_not_called();
    }
}

fn unanalysed() -> Vec<String> {
    ["b", "e", "g", "kwargs"].map(String::from).to_vec()
}

fn message(record: &ErrorRecord) -> Option<String> {
    record.downcast_ref::<TestError>().map(|e| e.0.clone())
}

type Seen = Arc<Mutex<Vec<(String, Vec<ErrorRecord>)>>>;

fn remember(seen: &Seen) -> impl Fn(&hoft_core::Failure, &[ErrorRecord]) + Send + Sync + 'static {
    let seen = Arc::clone(seen);
    move |failure, errors| {
        if let Ok(mut seen) = seen.lock() {
            seen.push((failure.to_string(), errors.to_vec()));
        }
    }
}

// =============================================================================
// WITHOUT A FALLBACK
// =============================================================================

#[test]
fn test_strict_with_handler_no_validator_errors() {
    init_tracing();
    let v = Validators::passing();
    let seen: Seen = Arc::default();
    let record = remember(&seen);
    let captured: Arc<Mutex<Option<bool>>> = Arc::default();
    let same = Arc::clone(&captured);

    let wrapped = v
        .analyser()
        .strict(true)
        .on_error(ErrorHandler::call(move |failure, errors| {
            record(failure, errors);
            if let Ok(mut same) = same.lock() {
                *same = Some(Arc::ptr_eq(failure, errors[0].error()));
            }
            Ok(())
        }))
        .wrap(voo());

    assert_eq!(wrapped.call(&call()).expect("handler suppresses"), "success");
    v.assert_all_called();

    let seen = seen.lock().expect("not poisoned");
    assert_eq!(seen.len(), 1);
    let (failure, errors) = &seen[0];
    assert_eq!(failure, "arguments not analysed: b, e, g, kwargs");
    assert_eq!(errors.len(), 1);
    let record = errors[0].as_not_analysed().expect("strictness record");
    assert_eq!(record.names, unanalysed());
    assert_eq!(
        errors[0].downcast_ref::<ArgsNotAnalysedError>(),
        Some(&ArgsNotAnalysedError::new(unanalysed()))
    );
    assert_eq!(*captured.lock().expect("not poisoned"), Some(true));
}

#[test]
fn test_strict_without_handler_no_validator_errors() {
    let v = Validators::passing();
    let wrapped = v.analyser().strict(true).wrap(voo());

    let err = wrapped.call(&call()).expect_err("strictness fails");
    assert!(err.is_rejected());
    let failure = err.downcast_ref::<ArgsNotAnalysedError>().expect("typed");
    assert_eq!(failure.names, unanalysed());

    assert_eq!(err.errors().len(), 1);
    let record = err.errors()[0].as_not_analysed().expect("strictness record");
    assert_eq!(record.names, unanalysed());
    assert_eq!(record.argspec, voo_spec());

    let bound = &record.callargs;
    assert_eq!(bound.len(), 8);
    for (name, value) in [
        ("a", Value::Int(11)),
        ("b", Value::Int(22)),
        ("c", Value::Int(33)),
        ("d", Value::Int(44)),
        ("e", Value::Int(99)),
        ("f", Value::from("2")),
        ("g", g_default()),
        ("kwargs", Value::empty_object()),
    ] {
        assert_eq!(bound.get(name), Some(&value), "{name}");
    }
    v.assert_all_called();
}

#[rstest]
#[case::strict(true, 4)]
#[case::lenient(false, 3)]
fn test_fail_slow_without_handler(#[case] strict: bool, #[case] expected_errors: usize) {
    let v = Validators::failing();
    let f_f = v.f_f.sig_keyword();
    let wrapped = v
        .analyser()
        .kwarg("f", f_f.clone())
        .policy(Policy::default().with_strict(strict))
        .wrap(voo());

    let err = wrapped.call(&call()).expect_err("validators fail");
    assert_eq!(err.downcast_ref::<TestError>(), Some(&TestError("a".into())));
    let errors = err.errors();
    assert_eq!(errors.len(), expected_errors);

    let a = errors[0].as_positional().expect("a record");
    assert_eq!((a.name.as_deref(), a.index, &a.value), (Some("a"), 0, &Value::Int(11)));
    assert_eq!(a.func_name.as_deref(), Some("f_a"));
    assert_eq!(message(&errors[0]).as_deref(), Some("a"));

    let c = errors[1].as_positional().expect("c record");
    assert_eq!((c.name.as_deref(), c.index, &c.value), (Some("c"), 2, &Value::Int(33)));
    assert_eq!(c.func_name.as_deref(), Some("f_c"));
    assert_eq!(message(&errors[1]).as_deref(), Some("c"));

    let f = errors[2].as_keyword().expect("f record");
    assert_eq!(f.name, "f");
    assert_eq!(f.value, NOVALUE);
    assert_eq!(f.default_value, Some(Value::from("2")));
    assert_eq!(f.func_name.as_deref(), Some("f_f"));
    assert_eq!(f.func, f_f.id());
    assert_eq!(message(&errors[2]).as_deref(), Some("f"));

    if strict {
        let rest = errors[3].as_not_analysed().expect("strictness record");
        assert_eq!(rest.names, unanalysed());
    }
    v.assert_all_called();
}

#[test]
fn test_strict_fail_fast_without_handler() {
    let v = Validators::failing();
    let wrapped = v.analyser().strict(true).fail_fast(true).wrap(voo());

    let err = wrapped.call(&call()).expect_err("f_a fails");
    assert_eq!(err.downcast_ref::<TestError>(), Some(&TestError("a".into())));
    assert_eq!(err.errors().len(), 1);
    let a = err.errors()[0].as_positional().expect("a record");
    assert_eq!(a.func_name.as_deref(), Some("f_a"));
    assert_eq!(a.name.as_deref(), Some("a"));
    assert_eq!(a.value, Value::Int(11));
    v.assert_only_a_called();
}

#[rstest]
#[case::fail_slow(false, 4)]
#[case::fail_fast(true, 1)]
fn test_strict_with_raising_handler(#[case] fail_fast: bool, #[case] expected_errors: usize) {
    let v = Validators::failing();
    let seen: Seen = Arc::default();
    let record = remember(&seen);

    let wrapped = v
        .analyser()
        .strict(true)
        .fail_fast(fail_fast)
        .on_error(ErrorHandler::raise(move |failure, errors| {
            record(failure, errors);
            Box::new(TestError("on_error".into()))
        }))
        .wrap(voo());

    let err = wrapped.call(&call()).expect_err("handler raises");
    assert!(matches!(err, AnalysisError::Raised { .. }));
    assert_eq!(err.downcast_ref::<TestError>(), Some(&TestError("on_error".into())));

    let seen = seen.lock().expect("not poisoned");
    assert_eq!(seen.len(), 1);
    let (failure, errors) = &seen[0];
    assert_eq!(failure, "a");
    assert_eq!(errors.len(), expected_errors);
    let a = errors[0].as_positional().expect("a record");
    assert_eq!((a.name.as_deref(), a.index), (Some("a"), 0));

    if fail_fast {
        v.assert_only_a_called();
    } else {
        v.assert_all_called();
    }
}

#[test]
fn test_keyword_validator_sees_value_supplied_positionally() {
    let f_c = Recorder::passing("f_c");
    let wrapped = AnalyseSig::new()
        .kwarg("c", f_c.sig_keyword())
        .wrap(voo());

    wrapped.call(&call()).expect("clean");
    f_c.assert_called_once_with(Call::SigKeyword {
        name: "c".into(),
        index: 2,
        called_with: CalledWith::Value(Value::Int(33)),
        default: None,
    });
}

#[test]
fn test_keyword_validator_on_unknown_parameter_is_rejected() {
    let wrapped = AnalyseSig::new()
        .kwarg("zzz", Validator::sig_keyword(|_, _, _, _| Ok(())))
        .wrap(voo());

    let err = wrapped.call(&call()).expect_err("no such parameter");
    assert!(matches!(err, AnalysisError::NoDefault(ref e) if e.name == "zzz"));
    assert!(err.errors().is_empty());
}

#[rstest]
#[case::missing(CallArgs::positional([1, 2]), BindError::MissingArguments(vec!["c".into(), "d".into()]))]
#[case::twice(CallArgs::positional([1, 2, 3, 4]).kwarg("a", 5), BindError::MultipleValues("a".into()))]
#[case::too_many(CallArgs::positional([1, 2, 3, 4, 5, 6, 7, 8]), BindError::TooManyPositional { expected: 7, given: 8 })]
fn test_unbindable_call_never_runs_validators(#[case] args: CallArgs, #[case] expected: BindError) {
    let v = Validators::passing();
    let wrapped = v.analyser().wrap(voo());

    let err = wrapped.call(&args).expect_err("does not bind");
    match err {
        AnalysisError::Bind(actual) => assert_eq!(actual, expected),
        other => panic!("expected a bind error, got {other:?}"),
    }
    v.f_a.assert_not_called();
}

#[test]
fn test_surplus_positional_values_dispatch_under_varargs_name() {
    let spec = ArgSpec::builder()
        .arg("a")
        .varargs("rest")
        .build()
        .expect("valid spec");
    let check = Recorder::passing("check");
    let wrapped = AnalyseSig::new()
        .arg(check.sig_positional())
        .arg(check.sig_positional())
        .arg(check.sig_positional())
        .strict(true)
        .wrap(Function::new("h", spec, |args: &CallArgs| args.len()));

    let err = wrapped.call(&CallArgs::positional([1, 2, 3])).expect_err("rest unhandled");
    assert_eq!(
        check.calls(),
        [
            Call::SigPositional { name: "a".into(), index: 0, value: Value::Int(1) },
            Call::SigPositional { name: "rest".into(), index: 1, value: Value::Int(2) },
            Call::SigPositional { name: "rest".into(), index: 2, value: Value::Int(3) },
        ]
    );
    let failure = err.downcast_ref::<ArgsNotAnalysedError>().expect("strictness");
    assert_eq!(failure.names, ["rest"]);
}

// =============================================================================
// WITH A FALLBACK
// =============================================================================

fn fallback_calls() -> Vec<Call> {
    let signature = voo_spec().signature();
    [
        ("b", Value::Int(22)),
        ("e", Value::Int(99)),
        ("g", g_default()),
        ("kwargs", Value::empty_object()),
    ]
    .into_iter()
    .map(|(name, value)| Call::Fallback {
        name: name.into(),
        value,
        signature: signature.clone(),
    })
    .collect()
}

#[test]
fn test_fallback_strict_with_handler_no_errors() {
    let v = Validators::passing();
    let f_all = Recorder::passing("f_all");
    let seen: Seen = Arc::default();
    let record = remember(&seen);

    let wrapped = v
        .analyser()
        .fallback(f_all.fallback())
        .strict(true)
        .on_error(ErrorHandler::call(move |failure, errors| {
            record(failure, errors);
            Ok(())
        }))
        .wrap(voo());

    assert_eq!(wrapped.call(&call()).expect("clean"), "success");
    assert!(seen.lock().expect("not poisoned").is_empty());
    v.assert_all_called();
    check_calls(&f_all, &fallback_calls());
    assert_eq!(f_all.called_names(), ["b", "e", "g", "kwargs"]);
}

#[test]
fn test_fallback_fail_slow_reports_seven_errors_in_dispatch_order() {
    let v = Validators::failing();
    let f_all = Recorder::failing("f_all", "all");
    let fallback = f_all.fallback();

    let wrapped = v
        .analyser()
        .fallback(fallback.clone())
        .strict(true)
        .wrap(voo());

    let err = wrapped.call(&call()).expect_err("everything fails");
    assert_eq!(err.downcast_ref::<TestError>(), Some(&TestError("a".into())));
    let errors = err.errors();
    assert_eq!(errors.len(), 7);

    let messages: Vec<_> = errors.iter().map(|e| message(e).unwrap_or_default()).collect();
    assert_eq!(messages, ["a", "c", "f", "all", "all", "all", "all"]);
    let names: Vec<_> = errors.iter().map(|e| e.name().unwrap_or_default()).collect();
    assert_eq!(names, ["a", "c", "f", "b", "e", "g", "kwargs"]);

    let b = errors[3].as_positional().expect("required parameter");
    assert_eq!((b.index, &b.value), (1, &Value::Int(22)));
    assert_eq!(b.func_name.as_deref(), Some("f_all"));
    assert_eq!(b.func, fallback.id());

    let e = errors[4].as_keyword().expect("defaulted parameter");
    assert_eq!(e.value, CalledWith::Value(Value::Int(99)));
    assert_eq!(e.default_value, Some(Value::Int(1)));

    let g = errors[5].as_keyword().expect("defaulted parameter");
    assert_eq!(g.value, CalledWith::Value(g_default()));
    assert_eq!(g.default_value, Some(g_default()));

    let kwargs = errors[6].as_keyword().expect("catch-all");
    assert_eq!(kwargs.value, CalledWith::Value(Value::empty_object()));
    assert_eq!(kwargs.default_value, Some(Value::empty_object()));

    v.assert_all_called();
    check_calls(&f_all, &fallback_calls());
}

#[rstest]
#[case::strict(true)]
#[case::lenient(false)]
fn test_fallback_fail_fast_stops_at_first_validator(#[case] strict: bool) {
    let v = Validators::failing();
    let f_all = Recorder::failing("f_all", "all");
    let wrapped = v
        .analyser()
        .fallback(f_all.fallback())
        .strict(strict)
        .fail_fast(true)
        .wrap(voo());

    let err = wrapped.call(&call()).expect_err("f_a fails");
    assert_eq!(err.errors().len(), 1);
    assert_eq!(message(&err.errors()[0]).as_deref(), Some("a"));
    v.assert_only_a_called();
    f_all.assert_not_called();
}

#[test]
fn test_fallback_with_raising_handler_fail_slow() {
    let v = Validators::failing();
    let f_all = Recorder::failing("f_all", "all");
    let wrapped = v
        .analyser()
        .fallback(f_all.fallback())
        .on_error(ErrorHandler::raise(|_, _| Box::new(TestError("on_error".into()))))
        .wrap(voo());

    let err = wrapped.call(&call()).expect_err("handler raises");
    assert_eq!(err.downcast_ref::<TestError>(), Some(&TestError("on_error".into())));
    assert_eq!(err.errors().len(), 7);
    v.assert_all_called();
    check_calls(&f_all, &fallback_calls());
}

#[test]
fn test_fallback_covers_everything_left_over() {
    let spec = ArgSpec::builder()
        .arg("a")
        .arg("b")
        .arg("c")
        .arg("d")
        .arg_default("e", 1)
        .build()
        .expect("valid spec");
    let f_a = Recorder::passing("f_a");
    let f_c = Recorder::passing("f_c");
    let f_all = Recorder::passing("f_all");

    let wrapped = AnalyseSig::new()
        .arg(f_a.sig_positional())
        .kwarg("c", f_c.sig_keyword())
        .fallback(f_all.fallback())
        .strict(true)
        .wrap(Function::new("voo", spec, |_: &CallArgs| ()));

    let errors = wrapped.analyse(&CallArgs::positional([1, 2, 3, 4])).expect("clean");
    assert!(errors.is_empty());
    f_a.assert_called_once_with(Call::SigPositional {
        name: "a".into(),
        index: 0,
        value: Value::Int(1),
    });
    f_c.assert_called_once_with(Call::SigKeyword {
        name: "c".into(),
        index: 2,
        called_with: CalledWith::Value(Value::Int(3)),
        default: None,
    });
    assert_eq!(f_all.called_names(), ["b", "d", "e"]);
}

#[rstest]
#[case::fail_slow(false, vec!["e", "g"])]
#[case::fail_fast(true, vec!["e"])]
fn test_keyword_validators_run_in_name_order(
    #[case] fail_fast: bool,
    #[case] expected: Vec<&str>,
) {
    let f_g = Recorder::failing("f_g", "g");
    let f_e = Recorder::failing("f_e", "e");

    let wrapped = AnalyseSig::new()
        .kwarg("g", f_g.sig_keyword())
        .kwarg("e", f_e.sig_keyword())
        .fail_fast(fail_fast)
        .wrap(voo());

    let err = wrapped.call(&call()).expect_err("both fail");
    let names: Vec<_> = err.errors().iter().filter_map(ErrorRecord::name).collect();
    assert_eq!(names, expected);
    assert_eq!(err.downcast_ref::<TestError>(), Some(&TestError("e".into())));

    assert_eq!(f_e.call_count(), 1);
    assert_eq!(f_g.call_count(), expected.len() - 1);
}
