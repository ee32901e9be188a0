//! Validator handles and slots.
//!
//! A validator is an observational callable: it inspects one argument and
//! either returns `Ok(())` or fails with any error type. Each analyser calls
//! its validators with a different argument shape, so there is one function
//! type per dispatch path:
//!
//! | path | called with |
//! |------|-------------|
//! | call-argument positional | `(value, index)` |
//! | call-argument keyword | `(name, value, present)` |
//! | signature positional | `(name, index, value)` |
//! | signature keyword | `(name, index, called_with, default)` |
//! | signature fallback | `(name, bound_value, signature)` |
//!
//! A slot is either a validator or [`IGNORE`], which skips the argument.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use hoft_types::{CalledWith, Signature, Value};

/// Error type returned by validators and error handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A validator failure, shared between the error list and the escalated error.
///
/// Recover the validator's own error type with `downcast_ref`.
pub type Failure = Arc<dyn std::error::Error + Send + Sync>;

pub type ValidatorResult = Result<(), BoxError>;

pub type PositionalFn = dyn Fn(&Value, usize) -> ValidatorResult + Send + Sync;
pub type KeywordFn = dyn Fn(&str, &Value, bool) -> ValidatorResult + Send + Sync;
pub type SigPositionalFn = dyn Fn(&str, usize, &Value) -> ValidatorResult + Send + Sync;
pub type SigKeywordFn =
    dyn Fn(&str, usize, &CalledWith, Option<&Value>) -> ValidatorResult + Send + Sync;
pub type FallbackFn = dyn Fn(&str, &Value, &Signature) -> ValidatorResult + Send + Sync;

/// Identity of a validator, for telling which one produced an error record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidatorId(usize);

/// A shareable validator with an optional display name.
pub struct Validator<F: ?Sized> {
    name: Option<Arc<str>>,
    func: Arc<F>,
}

impl<F: ?Sized> Clone for Validator<F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Validator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name)
            .field("id", &self.id())
            .finish()
    }
}

impl<F: ?Sized> Validator<F> {
    fn from_arc<C>(func: Arc<F>) -> Self {
        Self {
            name: display_name::<C>(),
            func,
        }
    }

    /// Override the display name.
    pub fn named(mut self, name: impl AsRef<str>) -> Self {
        self.name = Some(Arc::from(name.as_ref()));
        self
    }

    /// Display name: explicit, or the function's own name. Closures have none.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn id(&self) -> ValidatorId {
        ValidatorId(Arc::as_ptr(&self.func) as *const () as usize)
    }

    pub fn func(&self) -> &F {
        &self.func
    }
}

impl Validator<PositionalFn> {
    /// Call-argument positional validator: `(value, index)`.
    pub fn positional<C>(func: C) -> Self
    where
        C: Fn(&Value, usize) -> ValidatorResult + Send + Sync + 'static,
    {
        Self::from_arc::<C>(Arc::new(func))
    }
}

impl Validator<KeywordFn> {
    /// Call-argument keyword validator: `(name, value, present)`.
    pub fn keyword<C>(func: C) -> Self
    where
        C: Fn(&str, &Value, bool) -> ValidatorResult + Send + Sync + 'static,
    {
        Self::from_arc::<C>(Arc::new(func))
    }
}

impl Validator<SigPositionalFn> {
    /// Signature positional validator: `(name, index, value)`.
    pub fn sig_positional<C>(func: C) -> Self
    where
        C: Fn(&str, usize, &Value) -> ValidatorResult + Send + Sync + 'static,
    {
        Self::from_arc::<C>(Arc::new(func))
    }
}

impl Validator<SigKeywordFn> {
    /// Signature keyword validator: `(name, index, called_with, default)`.
    pub fn sig_keyword<C>(func: C) -> Self
    where
        C: Fn(&str, usize, &CalledWith, Option<&Value>) -> ValidatorResult + Send + Sync + 'static,
    {
        Self::from_arc::<C>(Arc::new(func))
    }
}

impl Validator<FallbackFn> {
    /// Fallback validator for parameters nothing else handled: `(name, value, signature)`.
    pub fn fallback<C>(func: C) -> Self
    where
        C: Fn(&str, &Value, &Signature) -> ValidatorResult + Send + Sync + 'static,
    {
        Self::from_arc::<C>(Arc::new(func))
    }
}

/// Name of a function item, trimmed to its last path segment. Generic
/// arguments are dropped; closures and fn pointers have no name.
fn display_name<C>() -> Option<Arc<str>> {
    let full = type_name::<C>();
    let pointer = ["fn(", "for<", "unsafe ", "extern "]
        .iter()
        .any(|prefix| full.starts_with(prefix));
    if pointer || full.contains("{{closure}}") {
        return None;
    }
    let path = full.split('<').next().unwrap_or(full);
    let last = path.rsplit("::").next()?;
    let is_ident = last
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && last.chars().all(|c| c.is_alphanumeric() || c == '_');
    is_ident.then(|| Arc::from(last))
}

/// Skip marker for a validator slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ignore;

/// Skip this argument: no validator call, no error.
pub const IGNORE: Ignore = Ignore;

/// One configured position or keyword.
pub enum Slot<F: ?Sized> {
    Validate(Validator<F>),
    Ignore,
}

impl<F: ?Sized> Slot<F> {
    pub fn validator(&self) -> Option<&Validator<F>> {
        match self {
            Slot::Validate(validator) => Some(validator),
            Slot::Ignore => None,
        }
    }

    pub fn is_ignore(&self) -> bool {
        matches!(self, Slot::Ignore)
    }
}

impl<F: ?Sized> Clone for Slot<F> {
    fn clone(&self) -> Self {
        match self {
            Slot::Validate(validator) => Slot::Validate(validator.clone()),
            Slot::Ignore => Slot::Ignore,
        }
    }
}

impl<F: ?Sized> fmt::Debug for Slot<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Validate(validator) => f.debug_tuple("Validate").field(validator).finish(),
            Slot::Ignore => f.write_str("Ignore"),
        }
    }
}

impl<F: ?Sized> From<Validator<F>> for Slot<F> {
    fn from(validator: Validator<F>) -> Self {
        Slot::Validate(validator)
    }
}

impl<F: ?Sized> From<Ignore> for Slot<F> {
    fn from(_: Ignore) -> Self {
        Slot::Ignore
    }
}
