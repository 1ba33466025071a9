//! Attribute sets: electrical/IO configuration attached to resources and subsignals.
//!
//! An [`Attrs`] value maps case-sensitive keys (e.g. `IO_TYPE`, `SLEWRATE`) to
//! either a literal string or a [`Resolver`] evaluated against the concrete
//! [`Platform`] at build time. Sets merge with child precedence via
//! [`Attrs::merge`]; resolvers run once, after all merging, in [`Attrs::resolve`].

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::ResolverError;
use crate::platform::Platform;

/// Attribute values after every resolver has been evaluated.
pub type ResolvedAttrs = IndexMap<String, String>;

type ResolverFn = dyn Fn(&Platform) -> Result<String, String> + Send + Sync;

/// A platform-dependent attribute value.
///
/// Wraps a pure function of the platform. The name is used for debug output
/// and carries no semantics.
#[derive(Clone)]
pub struct Resolver {
    name: String,
    func: Arc<ResolverFn>,
}

impl Resolver {
    /// Creates a named resolver from a closure.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Platform) -> Result<String, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Returns the resolver's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the resolver against a platform.
    pub fn call(&self, platform: &Platform) -> Result<String, String> {
        (self.func)(platform)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resolver({})", self.name)
    }
}

impl PartialEq for Resolver {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

/// A single attribute value: a literal or a platform-bound resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A fixed string.
    Literal(String),
    /// A value computed from the platform at build time.
    Resolver(Resolver),
}

impl AttrValue {
    /// Produces the final string for this value.
    pub fn resolve(&self, platform: &Platform) -> Result<String, String> {
        match self {
            AttrValue::Literal(s) => Ok(s.clone()),
            AttrValue::Resolver(r) => r.call(platform),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Literal(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Literal(s)
    }
}

impl From<Resolver> for AttrValue {
    fn from(r: Resolver) -> Self {
        AttrValue::Resolver(r)
    }
}

/// An ordered set of attributes with unique, case-sensitive keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    entries: IndexMap<String, AttrValue>,
}

impl Attrs {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an attribute, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds (or replaces) an attribute, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Option<AttrValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Looks up an attribute by key.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries.get(key)
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set has no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merges `child` over `self`.
    ///
    /// Keys present in both take the child's value but keep the parent's
    /// position; keys only in the child are appended in the child's order.
    pub fn merge(&self, child: &Attrs) -> Attrs {
        Attrs {
            entries: overlay(&self.entries, &child.entries),
        }
    }

    /// Evaluates every resolver against `platform`; literals pass through.
    pub fn resolve(&self, platform: &Platform) -> Result<ResolvedAttrs, ResolverError> {
        let mut resolved = ResolvedAttrs::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let value = value.resolve(platform).map_err(|message| ResolverError {
                key: key.clone(),
                message,
            })?;
            resolved.insert(key.clone(), value);
        }
        Ok(resolved)
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attrs::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

/// Overlays `child` on `parent` with child precedence.
///
/// This is the single merge law used for attribute sets, resolved attributes
/// and toolchain option overrides.
pub fn overlay<V: Clone>(
    parent: &IndexMap<String, V>,
    child: &IndexMap<String, V>,
) -> IndexMap<String, V> {
    let mut merged = parent.clone();
    for (key, value) in child {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
