//! External arguments handed to systems on each tick.
//!
//! The caller of [`World::run_tick`](crate::World::run_tick) fills an
//! [`ArgBundle`] with whatever the tick needs: delta time, the drawing
//! context, absolute time, input state. The key vocabulary is a contract
//! between the caller and the system authors; the world enforces no schema.
//!
//! Each system sees the bundle through an [`Args`] view that resolves the
//! keys it declared, by position. A key missing from the bundle (or holding
//! a value of another type) resolves to `None`; deciding what to do about
//! that is the action's job.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// A value stored in the bundle: either owned, or borrowed from the caller
/// for the duration of the tick (e.g. a drawing context).
enum ArgValue<'a> {
    Owned(Box<dyn Any>),
    Borrowed(&'a mut (dyn Any + 'static)),
}

impl ArgValue<'_> {
    fn as_any(&self) -> &(dyn Any + 'static) {
        match self {
            ArgValue::Owned(value) => &**value,
            ArgValue::Borrowed(value) => &**value,
        }
    }

    fn as_any_mut(&mut self) -> &mut (dyn Any + 'static) {
        match self {
            ArgValue::Owned(value) => &mut **value,
            ArgValue::Borrowed(value) => &mut **value,
        }
    }
}

/// A string-keyed bag of arbitrary values for one dispatch.
#[derive(Default)]
pub struct ArgBundle<'a> {
    values: HashMap<String, ArgValue<'a>>,
}

impl<'a> ArgBundle<'a> {
    /// Create an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Builder form of [`ArgBundle::insert`].
    #[must_use]
    pub fn with<T: Any>(mut self, key: impl Into<String>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder form of [`ArgBundle::insert_borrowed`].
    #[must_use]
    pub fn with_borrowed<T: Any>(mut self, key: impl Into<String>, value: &'a mut T) -> Self {
        self.insert_borrowed(key, value);
        self
    }

    /// Store an owned value under `key`, replacing any previous value.
    pub fn insert<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.values
            .insert(key.into(), ArgValue::Owned(Box::new(value)));
    }

    /// Lend a value to the bundle under `key` for the bundle's lifetime.
    pub fn insert_borrowed<T: Any>(&mut self, key: impl Into<String>, value: &'a mut T) {
        self.values.insert(key.into(), ArgValue::Borrowed(value));
    }

    /// Remove `key`. Returns `true` if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Returns the value under `key` if present and of type `T`.
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.as_any().downcast_ref::<T>()
    }

    /// Returns the value under `key` mutably if present and of type `T`.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key)?.as_any_mut().downcast_mut::<T>()
    }

    /// Returns `true` if `key` holds a value of any type.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the bundle holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ArgBundle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("ArgBundle").field("keys", &keys).finish()
    }
}

/// One system's view of the tick's [`ArgBundle`].
///
/// Position `i` corresponds to the `i`-th key the system declared.
pub struct Args<'r, 'a> {
    bundle: &'r mut ArgBundle<'a>,
    keys: &'r [String],
}

impl<'r, 'a> Args<'r, 'a> {
    /// Resolve `keys` against `bundle`.
    #[must_use]
    pub fn new(bundle: &'r mut ArgBundle<'a>, keys: &'r [String]) -> Self {
        Self { bundle, keys }
    }

    /// Returns the declared argument at `index`, or `None` if the key is
    /// absent from this tick's bundle or holds another type.
    #[must_use]
    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        let key = self.keys.get(index)?;
        self.bundle.get(key)
    }

    /// Mutable form of [`Args::get`].
    pub fn get_mut<T: Any>(&mut self, index: usize) -> Option<&mut T> {
        let key = self.keys.get(index)?;
        self.bundle.get_mut(key)
    }

    /// Returns `true` if the declared argument at `index` is present.
    #[must_use]
    pub fn is_present(&self, index: usize) -> bool {
        self.keys
            .get(index)
            .is_some_and(|key| self.bundle.contains_key(key))
    }

    /// Returns the keys this system declared, in order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        self.keys
    }

    /// Returns the number of declared arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the system declared no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for Args<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args").field("keys", &self.keys).finish()
    }
}
