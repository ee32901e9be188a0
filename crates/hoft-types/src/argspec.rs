//! Declared parameter lists.
//!
//! [`ArgSpec`] is the raw description a target publishes about itself:
//! every named parameter in declaration order, the defaults aligned to the
//! trailing parameters, and the names of the two variadic catch-alls.
//! [`Signature`] is the classified view derived from it, and [`BoundArgs`]
//! is what a concrete call looks like once mapped onto the declaration.
//!
//! ```text
//! fn(a, b, c = 1, *rest, **extra)
//!
//! ArgSpec   { args: [a, b, c], varargs: rest, defaults: [1], keywords: extra }
//! Signature { args: [a, b], varargs: rest, kwargs: {c: 1}, keywords: extra }
//! ```

use std::collections::{BTreeMap, HashSet};

use crate::call::CallArgs;
use crate::error::{BindError, NoDefaultError, SpecError};
use crate::value::Value;

/// Raw declared parameters of a callable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgSpec {
    args: Vec<String>,
    varargs: Option<String>,
    keywords: Option<String>,
    defaults: Vec<Value>,
}

impl ArgSpec {
    /// A callable that takes no parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start describing a parameter list.
    pub fn builder() -> ArgSpecBuilder {
        ArgSpecBuilder::default()
    }

    /// All named parameters, required first, in declaration order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Name of the variadic-positional catch-all, if declared.
    pub fn varargs(&self) -> Option<&str> {
        self.varargs.as_deref()
    }

    /// Name of the variadic-keyword catch-all, if declared.
    pub fn keywords(&self) -> Option<&str> {
        self.keywords.as_deref()
    }

    /// Default values, aligned to the trailing entries of [`args`](Self::args).
    pub fn defaults(&self) -> &[Value] {
        &self.defaults
    }

    /// Number of parameters that have a default.
    pub fn num_keywords(&self) -> usize {
        self.defaults.len()
    }

    /// Number of required parameters.
    pub fn num_positionals(&self) -> usize {
        self.args.len() - self.num_keywords()
    }

    /// Required parameter names in declaration order.
    pub fn positionals(&self) -> &[String] {
        &self.args[..self.num_positionals()]
    }

    /// Defaulted parameter names paired with their defaults, in declaration order.
    pub fn keywords_with_defaults(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.args[self.num_positionals()..]
            .iter()
            .map(String::as_str)
            .zip(self.defaults.iter())
    }

    /// Position of a named parameter in the full declared list.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.args.iter().position(|arg| arg == name)
    }

    /// True if `name` is a required parameter.
    pub fn is_required(&self, name: &str) -> bool {
        self.positionals().iter().any(|arg| arg == name)
    }

    /// Every declared name, variadic catch-alls included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.args
            .iter()
            .map(String::as_str)
            .chain(self.varargs.as_deref())
            .chain(self.keywords.as_deref())
    }

    /// The declared default of the keyword parameter `name`.
    pub fn default_value(&self, name: &str) -> Result<&Value, NoDefaultError> {
        let index = self.index_of(name).ok_or_else(|| NoDefaultError::new(name))?;
        index
            .checked_sub(self.num_positionals())
            .and_then(|offset| self.defaults.get(offset))
            .ok_or_else(|| NoDefaultError::new(name))
    }

    /// Classify the parameters into a [`Signature`].
    pub fn signature(&self) -> Signature {
        Signature::from(self)
    }

    /// Map a call's actual arguments onto the declared parameters.
    ///
    /// Omitted parameters receive their defaults. Surplus positional
    /// arguments are collected as an array under the variadic-positional
    /// name, unmatched keywords as an object under the variadic-keyword name.
    pub fn bind(&self, call: &CallArgs) -> Result<BoundArgs, BindError> {
        let mut bound = BTreeMap::new();

        for (name, value) in self.args.iter().zip(call.positional.iter()) {
            bound.insert(name.clone(), value.clone());
        }

        let surplus = call.positional.get(self.args.len()..).unwrap_or_default();
        match &self.varargs {
            Some(varargs) => {
                bound.insert(varargs.clone(), Value::Array(surplus.to_vec()));
            }
            None if !surplus.is_empty() => {
                return Err(BindError::TooManyPositional {
                    expected: self.args.len(),
                    given: call.positional.len(),
                });
            }
            None => {}
        }

        let mut extra = Vec::new();
        for (name, value) in &call.keywords {
            if self.index_of(name).is_some() {
                if bound.contains_key(name) {
                    return Err(BindError::MultipleValues(name.clone()));
                }
                bound.insert(name.clone(), value.clone());
            } else if self.keywords.is_some() {
                extra.push((name.clone(), value.clone()));
            } else {
                return Err(BindError::UnexpectedKeyword(name.clone()));
            }
        }
        if let Some(keywords) = &self.keywords {
            bound.insert(keywords.clone(), Value::Object(extra));
        }

        let mut missing = Vec::new();
        for name in &self.args {
            if bound.contains_key(name) {
                continue;
            }
            match self.default_value(name) {
                Ok(default) => {
                    bound.insert(name.clone(), default.clone());
                }
                Err(_) => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(BindError::MissingArguments(missing));
        }

        Ok(BoundArgs(bound))
    }
}

/// Builder for [`ArgSpec`].
#[derive(Debug, Default)]
pub struct ArgSpecBuilder {
    params: Vec<(String, Option<Value>)>,
    varargs: Option<String>,
    keywords: Option<String>,
}

impl ArgSpecBuilder {
    /// Declare a required parameter.
    pub fn arg(mut self, name: impl Into<String>) -> Self {
        self.params.push((name.into(), None));
        self
    }

    /// Declare a parameter with a default value.
    pub fn arg_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push((name.into(), Some(default.into())));
        self
    }

    /// Declare the variadic-positional catch-all.
    pub fn varargs(mut self, name: impl Into<String>) -> Self {
        self.varargs = Some(name.into());
        self
    }

    /// Declare the variadic-keyword catch-all.
    pub fn keywords(mut self, name: impl Into<String>) -> Self {
        self.keywords = Some(name.into());
        self
    }

    pub fn build(self) -> Result<ArgSpec, SpecError> {
        let mut seen = HashSet::new();
        let names = self
            .params
            .iter()
            .map(|(name, _)| name.as_str())
            .chain(self.varargs.as_deref())
            .chain(self.keywords.as_deref());
        for name in names {
            if !seen.insert(name) {
                return Err(SpecError::DuplicateParameter(name.to_string()));
            }
        }

        let mut args = Vec::with_capacity(self.params.len());
        let mut defaults = Vec::new();
        for (name, default) in self.params {
            match default {
                Some(value) => defaults.push(value),
                None if !defaults.is_empty() => {
                    return Err(SpecError::RequiredAfterDefault { name });
                }
                None => {}
            }
            args.push(name);
        }

        Ok(ArgSpec {
            args,
            varargs: self.varargs,
            keywords: self.keywords,
            defaults,
        })
    }
}

/// Classified declared parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    /// Required parameter names in declaration order.
    pub args: Vec<String>,
    /// Variadic-positional catch-all name.
    pub varargs: Option<String>,
    /// Defaulted parameters and their defaults, in declaration order.
    pub kwargs: Vec<(String, Value)>,
    /// Variadic-keyword catch-all name.
    pub keywords: Option<String>,
}

impl Signature {
    /// Number of required parameters.
    pub fn num_required(&self) -> usize {
        self.args.len()
    }

    /// Number of defaulted parameters.
    pub fn num_keywords(&self) -> usize {
        self.kwargs.len()
    }

    /// Position of a required parameter.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.args.iter().position(|arg| arg == name)
    }

    /// The default of the keyword parameter `name`.
    pub fn default_value(&self, name: &str) -> Result<&Value, NoDefaultError> {
        self.kwargs
            .iter()
            .find(|(kw, _)| kw == name)
            .map(|(_, value)| value)
            .ok_or_else(|| NoDefaultError::new(name))
    }
}

impl From<&ArgSpec> for Signature {
    fn from(spec: &ArgSpec) -> Self {
        Self {
            args: spec.positionals().to_vec(),
            varargs: spec.varargs.clone(),
            kwargs: spec
                .keywords_with_defaults()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            keywords: spec.keywords.clone(),
        }
    }
}

/// A call mapped onto declared parameter names, defaults substituted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs(BTreeMap<String, Value>);

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Bound names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Name/value pairs in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The whole binding as one object value.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for BoundArgs {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
