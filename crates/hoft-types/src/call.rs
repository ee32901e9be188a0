//! The actual arguments of one call.

use std::collections::BTreeMap;

use crate::value::Value;

/// Positional values plus keyword values, exactly as the caller supplied them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    /// Positional arguments in call order.
    pub positional: Vec<Value>,
    /// Keyword arguments by name.
    pub keywords: BTreeMap<String, Value>,
}

impl CallArgs {
    /// A call with no arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// A call with positional arguments only.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keywords: BTreeMap::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add (or replace) a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    /// Look up a keyword argument.
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }

    /// True if `name` was passed by keyword.
    pub fn has_keyword(&self, name: &str) -> bool {
        self.keywords.contains_key(name)
    }

    /// Total number of arguments supplied.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}
