//! What a munch does when a key is absent.

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::{MunchError, Result};
use crate::container::Munch;
use crate::value::{Dict, Key, List, Value};

/// A named zero-argument generator of values, the `default_factory` of the
/// factory variants. Clones share the same generator.
#[derive(Clone)]
pub struct Factory {
    name: Rc<str>,
    make: Rc<dyn Fn() -> Value>,
}

impl Factory {
    pub fn new<F>(name: &str, make: F) -> Self
    where
        F: Fn() -> Value + 'static,
    {
        Self {
            name: Rc::from(name),
            make: Rc::new(make),
        }
    }
    /// Produces a fresh empty list on every call.
    pub fn list() -> Self {
        Self::new("list", || Value::List(List::new()))
    }
    /// Produces a fresh empty dict on every call.
    pub fn dict() -> Self {
        Self::new("dict", || Value::Dict(Dict::new()))
    }
    /// Produces a fresh plain munch on every call.
    pub fn munch() -> Self {
        Self::new("Munch", || Value::Munch(Munch::new()))
    }
    /// Produces a fresh recursive munch on every call.
    pub fn recursive() -> Self {
        Self::new("RecursiveMunch", || Value::Munch(Munch::recursive()))
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn call(&self) -> Value {
        (self.make)()
    }
    /// True when both factories share the same generator.
    pub fn ptr_eq(&self, other: &Factory) -> bool {
        Rc::ptr_eq(&self.make, &other.make)
    }
}
impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Factory({})", self.name)
    }
}

/// The miss-policy strategy attached to every munch.
#[derive(Clone, Debug, Default)]
pub enum MissPolicy {
    #[default]
    Fail,
    Default(Value),
    Factory(Factory),
}

impl MissPolicy {
    /// Item lookup miss on `owner`.
    pub(crate) fn resolve(&self, owner: &Munch, key: Key) -> Result<Value> {
        match self {
            MissPolicy::Fail => Err(MunchError::Key(key)),
            MissPolicy::Default(default) => Ok(default.clone()),
            MissPolicy::Factory(factory) => {
                let value = factory.call();
                debug!(key = %key, factory = factory.name(), "auto-vivified missing key");
                owner.set_item(key, value.clone())?;
                Ok(value)
            }
        }
    }
    /// Attribute lookup miss on `owner`. The factory is reached through item
    /// lookup, so the vivified value is stored just like an item miss.
    pub(crate) fn resolve_attr(&self, owner: &Munch, name: &str) -> Result<Value> {
        match self {
            MissPolicy::Fail => Err(MunchError::Attribute(name.to_owned())),
            MissPolicy::Default(default) => Ok(default.clone()),
            MissPolicy::Factory(_) => owner
                .get_item(name)
                .map_err(|_| MunchError::Attribute(name.to_owned())),
        }
    }
}
