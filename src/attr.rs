//! Attribute access on munches.
//!
//! Every attribute operation is one dispatch function with a fixed lookup
//! order: per-instance slot, intrinsic member, mapping key, miss policy.
//! Failures on this path are always [`MunchError::Attribute`].

use tracing::trace;

use crate::convert::munchify_with;
use crate::error::{MunchError, Result};
use crate::container::{Munch, Variant};
use crate::policy::Factory;
use crate::value::Value;

/// The intrinsic operations of a munch. Their names shadow mapping keys of
/// the same name on the attribute path; item access still reaches the keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Member {
    Clear,
    Copy,
    Get,
    Items,
    Keys,
    Pop,
    PopItem,
    SetDefault,
    Update,
    Values,
    ToDict,
    FromDict,
    ToJson,
    FromJson,
    ToYaml,
    FromYaml,
    CaptureState,
    RestoreState,
}

impl Member {
    pub const ALL: [Member; 18] = [
        Member::Clear,
        Member::Copy,
        Member::Get,
        Member::Items,
        Member::Keys,
        Member::Pop,
        Member::PopItem,
        Member::SetDefault,
        Member::Update,
        Member::Values,
        Member::ToDict,
        Member::FromDict,
        Member::ToJson,
        Member::FromJson,
        Member::ToYaml,
        Member::FromYaml,
        Member::CaptureState,
        Member::RestoreState,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Member::Clear => "clear",
            Member::Copy => "copy",
            Member::Get => "get",
            Member::Items => "items",
            Member::Keys => "keys",
            Member::Pop => "pop",
            Member::PopItem => "popitem",
            Member::SetDefault => "setdefault",
            Member::Update => "update",
            Member::Values => "values",
            Member::ToDict => "to_dict",
            Member::FromDict => "from_dict",
            Member::ToJson => "to_json",
            Member::FromJson => "from_json",
            Member::ToYaml => "to_yaml",
            Member::FromYaml => "from_yaml",
            Member::CaptureState => "capture_state",
            Member::RestoreState => "restore_state",
        }
    }
    pub fn from_name(name: &str) -> Option<Member> {
        Member::ALL.iter().copied().find(|m| m.name() == name)
    }
}

/// What an attribute read resolved to.
#[derive(Clone, Debug)]
pub enum Attribute {
    Method(Member),
    Value(Value),
    Factory(Factory),
}

impl Attribute {
    /// The data behind the attribute, if it is plain data.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Attribute::Value(value) => Some(value),
            _ => None,
        }
    }
}

const DICT: &str = "__dict__";
const DEFAULT: &str = "__default__";
const DEFAULT_FACTORY: &str = "default_factory";

impl Munch {
    /// Names answered before the key space is consulted.
    fn is_intrinsic(&self, name: &str) -> bool {
        if Member::from_name(name).is_some() || name == DICT {
            return true;
        }
        match self.variant() {
            Variant::DefaultMunch => name == DEFAULT,
            Variant::DefaultFactoryMunch | Variant::RecursiveMunch => name == DEFAULT_FACTORY,
            _ => false,
        }
    }

    pub fn get_attr(&self, name: &str) -> Result<Attribute> {
        let slot = self.state().slots.get(name).cloned();
        if let Some(value) = slot {
            return Ok(Attribute::Value(value));
        }
        if let Some(member) = Member::from_name(name) {
            return Ok(Attribute::Method(member));
        }
        if name == DICT {
            return self
                .to_dict()
                .map(|dict| Attribute::Value(Value::Dict(dict)))
                .map_err(|_| MunchError::Attribute(name.to_owned()));
        }
        if name == DEFAULT {
            if let Some(default) = self.default_value() {
                return Ok(Attribute::Value(default));
            }
        }
        if name == DEFAULT_FACTORY {
            if let Some(factory) = self.default_factory() {
                return Ok(Attribute::Factory(factory));
            }
        }
        if let Some(value) = self.lookup(&name.into()) {
            return Ok(Attribute::Value(value));
        }
        let policy = self.policy();
        policy.resolve_attr(self, name).map(Attribute::Value)
    }

    /// Attribute read for data. Members and factories are not data and fail
    /// as if the attribute were missing.
    pub fn attr(&self, name: &str) -> Result<Value> {
        self.get_attr(name)?
            .into_value()
            .ok_or_else(|| MunchError::Attribute(name.to_owned()))
    }

    pub fn set_attr(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if name == DEFAULT && self.variant() == Variant::DefaultMunch {
            return self.set_default_value(value);
        }
        // read-only intrinsics
        if name == DICT || (name == DEFAULT_FACTORY && self.default_factory().is_some()) {
            return Err(MunchError::Attribute(name.to_owned()));
        }
        if self.state().slots.contains_key(name) || self.is_intrinsic(name) {
            trace!(name, "attribute slot written");
            self.state_mut().slots.insert(name.to_owned(), value);
            return Ok(());
        }
        let value = match (self.variant(), value) {
            (Variant::AutoMunch, Value::Dict(dict)) => {
                munchify_with(&Value::Dict(dict), Munch::auto)
                    .map_err(|_| MunchError::Attribute(name.to_owned()))?
            }
            (_, value) => value,
        };
        self.set_item(name, value)
            .map_err(|_| MunchError::Attribute(name.to_owned()))
    }

    pub fn del_attr(&self, name: &str) -> Result<()> {
        let removed = self.state_mut().slots.shift_remove(name);
        if removed.is_some() {
            return Ok(());
        }
        if self.is_intrinsic(name) {
            return Err(MunchError::Attribute(name.to_owned()));
        }
        self.del_item(name)
            .map(|_| ())
            .map_err(|_| MunchError::Attribute(name.to_owned()))
    }

    /// True when an attribute read would succeed without touching the miss
    /// policy.
    pub fn has_attr(&self, name: &str) -> bool {
        self.state().slots.contains_key(name)
            || self.is_intrinsic(name)
            || self.contains_key(name)
    }

    /// Attribute names: members, slots, then identifier-shaped string keys.
    pub fn dir(&self) -> Vec<String> {
        let mut names: Vec<String> = Member::ALL.iter().map(|m| m.name().to_owned()).collect();
        names.extend(self.state().slots.keys().cloned());
        names.extend(
            self.keys()
                .into_iter()
                .filter_map(|k| k.as_str().map(str::to_owned))
                .filter(|k| crate::value::is_identifier(k)),
        );
        names
    }
}
