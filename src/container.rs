//! The munch container: an insertion ordered mapping whose string keys can
//! also be reached as attributes (see the `attr` module for that half).
//!
//! All variants share this one implementation. A munch carries a
//! [`Variant`] tag naming its concrete type and a [`MissPolicy`] deciding what
//! an absent key produces.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::convert::{munchify_with, unmunchify};
use crate::error::{MunchError, Result};
use crate::policy::{Factory, MissPolicy};
use crate::repr;
use crate::value::{Comparison, Dict, Key, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Munch,
    AutoMunch,
    DefaultMunch,
    DefaultFactoryMunch,
    RecursiveMunch,
}

impl Variant {
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Munch => "Munch",
            Variant::AutoMunch => "AutoMunch",
            Variant::DefaultMunch => "DefaultMunch",
            Variant::DefaultFactoryMunch => "DefaultFactoryMunch",
            Variant::RecursiveMunch => "RecursiveMunch",
        }
    }
}

/// Accepts or refuses keys written through the item path.
pub type KeyGuard = Rc<dyn Fn(&Key) -> std::result::Result<(), String>>;

pub(crate) struct MunchState {
    pub(crate) entries: IndexMap<Key, Value>,
    pub(crate) variant: Variant,
    pub(crate) policy: MissPolicy,
    // per-instance attributes living outside the key space
    pub(crate) slots: IndexMap<String, Value>,
    pub(crate) guard: Option<KeyGuard>,
}

#[derive(Clone)]
pub struct Munch(Rc<RefCell<MunchState>>);

impl Munch {
    fn with_parts(variant: Variant, policy: MissPolicy, guard: Option<KeyGuard>) -> Self {
        Munch(Rc::new(RefCell::new(MunchState {
            entries: IndexMap::new(),
            variant,
            policy,
            slots: IndexMap::new(),
            guard,
        })))
    }
    pub fn new() -> Self {
        Self::with_parts(Variant::Munch, MissPolicy::Fail, None)
    }
    /// A munch that turns plain dicts assigned as attributes into munches.
    pub fn auto() -> Self {
        Self::with_parts(Variant::AutoMunch, MissPolicy::Fail, None)
    }
    /// A munch returning `default` for absent keys.
    pub fn with_default(default: impl Into<Value>) -> Self {
        Self::with_parts(Variant::DefaultMunch, MissPolicy::Default(default.into()), None)
    }
    /// A munch storing `factory()` under absent keys on lookup.
    pub fn with_factory(factory: Factory) -> Self {
        Self::with_parts(Variant::DefaultFactoryMunch, MissPolicy::Factory(factory), None)
    }
    /// A munch whose absent keys become new recursive munches.
    pub fn recursive() -> Self {
        Self::with_parts(
            Variant::RecursiveMunch,
            MissPolicy::Factory(Factory::recursive()),
            None,
        )
    }
    /// An empty munch of the same concrete type: same variant, same default or
    /// factory, same key guard. Per-instance attributes are not carried over.
    pub fn blank_like(&self) -> Munch {
        let state = self.0.borrow();
        Self::with_parts(state.variant, state.policy.clone(), state.guard.clone())
    }

    pub fn variant(&self) -> Variant {
        self.0.borrow().variant
    }
    pub fn type_name(&self) -> &'static str {
        self.variant().name()
    }
    pub fn policy(&self) -> MissPolicy {
        self.0.borrow().policy.clone()
    }
    pub fn default_value(&self) -> Option<Value> {
        match &self.0.borrow().policy {
            MissPolicy::Default(default) => Some(default.clone()),
            _ => None,
        }
    }
    /// Replaces the default of a default munch. Other variants have no default
    /// and refuse.
    pub fn set_default_value(&self, default: impl Into<Value>) -> Result<()> {
        let mut state = self.0.borrow_mut();
        match &mut state.policy {
            MissPolicy::Default(current) => {
                *current = default.into();
                Ok(())
            }
            _ => Err(MunchError::Attribute("__default__".to_owned())),
        }
    }
    pub fn default_factory(&self) -> Option<Factory> {
        match &self.0.borrow().policy {
            MissPolicy::Factory(factory) => Some(factory.clone()),
            _ => None,
        }
    }
    /// Installs a check run before every item write.
    pub fn set_key_guard<F>(&self, guard: F)
    where
        F: Fn(&Key) -> std::result::Result<(), String> + 'static,
    {
        self.0.borrow_mut().guard = Some(Rc::new(guard));
    }
    pub fn ptr_eq(&self, other: &Munch) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
    pub(crate) fn state(&self) -> Ref<'_, MunchState> {
        self.0.borrow()
    }
    pub(crate) fn state_mut(&self) -> std::cell::RefMut<'_, MunchState> {
        self.0.borrow_mut()
    }
    pub(crate) fn entries(&self) -> Ref<'_, IndexMap<Key, Value>> {
        Ref::map(self.0.borrow(), |state| &state.entries)
    }
    pub(crate) fn lookup(&self, key: &Key) -> Option<Value> {
        self.0.borrow().entries.get(key).cloned()
    }

    // ------------- item access -------------
    pub fn len(&self) -> usize {
        self.0.borrow().entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.borrow().entries.is_empty()
    }
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.0.borrow().entries.contains_key(&key.into())
    }
    /// The value under `key`, or what the miss policy makes of its absence.
    pub fn get_item(&self, key: impl Into<Key>) -> Result<Value> {
        let key = key.into();
        match self.lookup(&key) {
            Some(value) => Ok(value),
            None => {
                let policy = self.policy();
                policy.resolve(self, key)
            }
        }
    }
    /// The value under `key`, or `default`. Never consults the miss policy.
    pub fn get(&self, key: impl Into<Key>, default: impl Into<Value>) -> Value {
        self.lookup(&key.into()).unwrap_or_else(|| default.into())
    }
    pub fn set_item(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        let guard = self.0.borrow().guard.clone();
        if let Some(guard) = guard {
            guard(&key).map_err(|reason| MunchError::Rejected {
                key: key.clone(),
                reason,
            })?;
        }
        self.0.borrow_mut().entries.insert(key, value.into());
        Ok(())
    }
    pub fn del_item(&self, key: impl Into<Key>) -> Result<Value> {
        let key = key.into();
        let removed = self.0.borrow_mut().entries.shift_remove(&key);
        removed.ok_or(MunchError::Key(key))
    }
    pub fn pop(&self, key: impl Into<Key>) -> Result<Value> {
        self.del_item(key)
    }
    /// Removes and returns the most recently inserted entry.
    pub fn popitem(&self) -> Option<(Key, Value)> {
        self.0.borrow_mut().entries.pop()
    }
    pub fn clear(&self) {
        self.0.borrow_mut().entries.clear();
    }
    /// Sets `key` to `default` when absent, then returns the current value.
    pub fn setdefault(&self, key: impl Into<Key>, default: impl Into<Value>) -> Result<Value> {
        let key = key.into();
        if !self.contains_key(&key) {
            self.set_item(key.clone(), default)?;
        }
        self.get_item(key)
    }
    /// Writes every pair through `set_item`, in order.
    pub fn update<I, K, V>(&self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        for (key, value) in pairs {
            self.set_item(key, value)?;
        }
        Ok(())
    }
    /// Merges the entries of a dict or munch through `set_item`.
    pub fn update_from(&self, mapping: &Value) -> Result<()> {
        let items = mapping.mapping_items().ok_or(MunchError::NotAMapping {
            found: mapping.type_name(),
        })?;
        self.update(items)
    }
    pub fn keys(&self) -> Vec<Key> {
        self.0.borrow().entries.keys().cloned().collect()
    }
    pub fn values(&self) -> Vec<Value> {
        self.0.borrow().entries.values().cloned().collect()
    }
    pub fn items(&self) -> Vec<(Key, Value)> {
        self.0
            .borrow()
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    // ------------- conversion -------------
    /// Recursively converts this munch back into plain dicts.
    pub fn to_dict(&self) -> Result<Dict> {
        match unmunchify(&Value::Munch(self.clone()))? {
            Value::Dict(dict) => Ok(dict),
            other => Err(MunchError::NotAMapping {
                found: other.type_name(),
            }),
        }
    }
    fn convert_root<F: Fn() -> Munch>(source: &Value, factory: F) -> Result<Munch> {
        if !source.is_mapping() {
            return Err(MunchError::NotAMapping {
                found: source.type_name(),
            });
        }
        munchify_with(source, factory)?
            .into_munch()
            .ok_or(MunchError::NotAMapping {
                found: source.type_name(),
            })
    }
    /// Recursively copies a mapping into munches.
    pub fn from_dict(source: &Value) -> Result<Munch> {
        Self::convert_root(source, Munch::new)
    }
    pub fn auto_from_dict(source: &Value) -> Result<Munch> {
        Self::convert_root(source, Munch::auto)
    }
    pub fn default_from_dict(default: impl Into<Value>, source: &Value) -> Result<Munch> {
        let default = default.into();
        Self::convert_root(source, || Munch::with_default(default.clone()))
    }
    pub fn factory_from_dict(factory: Factory, source: &Value) -> Result<Munch> {
        Self::convert_root(source, || Munch::with_factory(factory.clone()))
    }
    pub fn recursive_from_dict(source: &Value) -> Result<Munch> {
        Self::convert_root(source, Munch::recursive)
    }
    /// Deep structural copy of the same concrete type. Nested mappings,
    /// munches included, become munches of this type.
    pub fn copy(&self) -> Result<Munch> {
        let prototype = self.clone();
        Self::convert_root(&Value::Munch(self.clone()), || prototype.blank_like())
    }
}

impl Default for Munch {
    fn default() -> Self {
        Self::new()
    }
}
impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Munch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let munch = Munch::new();
        munch
            .0
            .borrow_mut()
            .entries
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
        munch
    }
}
impl PartialEq for Munch {
    fn eq(&self, other: &Self) -> bool {
        Comparison::default().values(&Value::Munch(self.clone()), &Value::Munch(other.clone()))
    }
}
impl fmt::Display for Munch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&repr::repr(&Value::Munch(self.clone())))
    }
}
impl fmt::Debug for Munch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&repr::repr(&Value::Munch(self.clone())))
    }
}
