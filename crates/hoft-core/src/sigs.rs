//! Signature introspection for callable targets.
//!
//! A target describes its own parameters by exposing an [`ArgSpec`]; there is
//! no runtime reflection. [`signature`] classifies that description, and
//! [`ArgSpec::bind`] maps a concrete call onto it.

use std::fmt;

use hoft_types::{ArgSpec, CallArgs, Signature};

/// Anything that can describe its declared parameters.
pub trait Introspect {
    /// Declared parameters.
    fn argspec(&self) -> &ArgSpec;

    /// Name used in logs.
    fn name(&self) -> &str {
        "<anonymous>"
    }
}

/// A callable target.
pub trait Target: Introspect {
    type Output;

    /// Invoke the target with the caller's arguments.
    fn call(&self, args: &CallArgs) -> Self::Output;
}

/// The classified signature of a target.
pub fn signature<T: Introspect + ?Sized>(target: &T) -> Signature {
    target.argspec().signature()
}

/// A named function body paired with its declared parameters.
pub struct Function<F> {
    name: String,
    argspec: ArgSpec,
    body: F,
}

impl<F, R> Function<F>
where
    F: Fn(&CallArgs) -> R,
{
    pub fn new(name: impl Into<String>, argspec: ArgSpec, body: F) -> Self {
        Self {
            name: name.into(),
            argspec,
            body,
        }
    }
}

impl<F> Introspect for Function<F> {
    fn argspec(&self) -> &ArgSpec {
        &self.argspec
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F, R> Target for Function<F>
where
    F: Fn(&CallArgs) -> R,
{
    type Output = R;

    fn call(&self, args: &CallArgs) -> R {
        (self.body)(args)
    }
}

impl<F> fmt::Debug for Function<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("argspec", &self.argspec)
            .finish()
    }
}
