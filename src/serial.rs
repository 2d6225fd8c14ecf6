//! JSON and YAML glue. The encoders are serde_json and serde_yaml; this module
//! only maps between their value trees and ours.
//!
//! Munches are written as ordinary mappings. YAML can instead tag them with
//! their type (`!munch.Munch`), and a [`TagRegistry`] decides which tags are
//! turned back into containers when loading.

use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_yaml::value::{Tag, TaggedValue};
use tracing::debug;

use crate::convert::munchify_with;
use crate::error::{MunchError, Result};
use crate::container::Munch;
use crate::policy::Factory;
use crate::value::{Dict, Key, Value};

// ------------- JSON -------------
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsonOptions {
    /// Pretty print with this many spaces per level; compact when absent.
    pub indent: Option<usize>,
    pub sort_keys: bool,
}

impl JsonOptions {
    pub fn indented(indent: usize) -> Self {
        Self {
            indent: Some(indent),
            ..Self::default()
        }
    }
}

fn json_key(key: &Key) -> String {
    match key {
        Key::Str(s) => s.clone(),
        Key::Int(i) => i.to_string(),
        Key::Bool(b) => b.to_string(),
    }
}

fn enter(active: &mut Vec<usize>, value: &Value) -> Option<usize> {
    let id = value.identity()?;
    if active.contains(&id) {
        return None;
    }
    active.push(id);
    Some(id)
}

fn to_json_value(
    value: &Value,
    options: &JsonOptions,
    active: &mut Vec<usize>,
) -> Result<serde_json::Value> {
    use serde_json::Value as Json;
    let json = match value {
        Value::None => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| MunchError::Json(format!("Out of range float value: {}", f)))?,
        Value::Str(s) => Json::String(s.clone()),
        container => {
            if enter(active, container).is_none() {
                return Err(MunchError::Json("Circular reference detected".to_owned()));
            }
            let json = match container {
                Value::List(list) => Json::Array(
                    list.to_vec()
                        .iter()
                        .map(|item| to_json_value(item, options, active))
                        .collect::<Result<_>>()?,
                ),
                Value::Tuple(tuple) => Json::Array(
                    tuple
                        .items()
                        .iter()
                        .map(|item| to_json_value(item, options, active))
                        .collect::<Result<_>>()?,
                ),
                _ => {
                    let mut items: Vec<(String, Value)> = container
                        .mapping_items()
                        .unwrap_or_default()
                        .into_iter()
                        .map(|(k, v)| (json_key(&k), v))
                        .collect();
                    if options.sort_keys {
                        items.sort_by(|a, b| a.0.cmp(&b.0));
                    }
                    let mut object = serde_json::Map::new();
                    for (key, item) in items {
                        object.insert(key, to_json_value(&item, options, active)?);
                    }
                    Json::Object(object)
                }
            };
            active.pop();
            json
        }
    };
    Ok(json)
}

/// Encodes any value. Mapping keys become strings, tuples become arrays.
/// Cycles and non-finite floats cannot be encoded.
pub fn to_json(value: &Value, options: &JsonOptions) -> Result<String> {
    let json = to_json_value(value, options, &mut Vec::new())?;
    match options.indent {
        None => Ok(serde_json::to_string(&json)?),
        Some(width) => {
            let indent = " ".repeat(width);
            let mut out = Vec::new();
            let mut serializer = serde_json::Serializer::with_formatter(
                &mut out,
                PrettyFormatter::with_indent(indent.as_bytes()),
            );
            json.serialize(&mut serializer)?;
            String::from_utf8(out).map_err(|e| MunchError::Json(e.to_string()))
        }
    }
}

fn from_json_value(json: serde_json::Value) -> Value {
    use serde_json::Value as Json;
    match json {
        Json::Null => Value::None,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::None, Value::Float),
        },
        Json::String(s) => Value::Str(s),
        Json::Array(items) => Value::List(items.into_iter().map(from_json_value).collect()),
        Json::Object(object) => Value::Dict(
            object
                .into_iter()
                .map(|(k, v)| (k, from_json_value(v)))
                .collect(),
        ),
    }
}

/// Parses JSON into plain values: objects become dicts, in document order.
pub fn load_json(text: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(from_json_value(json))
}

pub fn from_json(text: &str) -> Result<Value> {
    from_json_with(text, Munch::new)
}

/// Parses JSON and munchifies it, every object becoming `factory()`.
pub fn from_json_with<F: Fn() -> Munch>(text: &str, factory: F) -> Result<Value> {
    munchify_with(&load_json(text)?, factory)
}

// ------------- YAML -------------
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum YamlStyle {
    /// Munches are plain mappings.
    #[default]
    Safe,
    /// Munches are mappings tagged `!munch.<TypeName>`.
    Tagged,
}

pub type Constructor = Rc<dyn Fn() -> Munch>;

/// Tags recognised when loading YAML, each with the container it builds.
#[derive(Clone, Default)]
pub struct TagRegistry {
    constructors: HashMap<String, Constructor>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    /// One tag per variant. A tag carries no default and no factory: default
    /// munches load with a `None` default and factory munches with
    /// [`Factory::munch`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("munch", Munch::new);
        registry.register("munch.Munch", Munch::new);
        registry.register("munch.AutoMunch", Munch::auto);
        registry.register("munch.DefaultMunch", || Munch::with_default(Value::None));
        registry.register("munch.DefaultFactoryMunch", || Munch::with_factory(Factory::munch()));
        registry.register("munch.RecursiveMunch", Munch::recursive);
        registry
    }
    /// Registers a tag, with or without its leading `!`.
    pub fn register<F>(&mut self, tag: &str, constructor: F)
    where
        F: Fn() -> Munch + 'static,
    {
        let tag = tag.trim_start_matches('!').to_owned();
        debug!(tag = %tag, "registered yaml tag");
        self.constructors.insert(tag, Rc::new(constructor));
    }
    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag.trim_start_matches('!'))
    }
    /// A new empty container for `tag`, if registered.
    pub fn resolve(&self, tag: &str) -> Option<Munch> {
        self.constructors
            .get(tag.trim_start_matches('!'))
            .map(|constructor| constructor())
    }
}

fn yaml_key(key: &Key) -> serde_yaml::Value {
    match key {
        Key::Str(s) => serde_yaml::Value::String(s.clone()),
        Key::Int(i) => serde_yaml::Value::from(*i),
        Key::Bool(b) => serde_yaml::Value::Bool(*b),
    }
}

fn to_yaml_value(value: &Value, style: YamlStyle, active: &mut Vec<usize>) -> Result<serde_yaml::Value> {
    use serde_yaml::Value as Yaml;
    let yaml = match value {
        Value::None => Yaml::Null,
        Value::Bool(b) => Yaml::Bool(*b),
        Value::Int(i) => Yaml::from(*i),
        Value::Float(f) => Yaml::from(*f),
        Value::Str(s) => Yaml::String(s.clone()),
        container => {
            if enter(active, container).is_none() {
                return Err(MunchError::Yaml("Circular reference detected".to_owned()));
            }
            let yaml = match container {
                Value::List(list) => Yaml::Sequence(
                    list.to_vec()
                        .iter()
                        .map(|item| to_yaml_value(item, style, active))
                        .collect::<Result<_>>()?,
                ),
                Value::Tuple(tuple) => Yaml::Sequence(
                    tuple
                        .items()
                        .iter()
                        .map(|item| to_yaml_value(item, style, active))
                        .collect::<Result<_>>()?,
                ),
                _ => {
                    let mut mapping = serde_yaml::Mapping::new();
                    for (key, item) in container.mapping_items().unwrap_or_default() {
                        mapping.insert(yaml_key(&key), to_yaml_value(&item, style, active)?);
                    }
                    match (style, container) {
                        (YamlStyle::Tagged, Value::Munch(munch)) => {
                            Yaml::Tagged(Box::new(TaggedValue {
                                tag: Tag::new(format!("munch.{}", munch.type_name())),
                                value: Yaml::Mapping(mapping),
                            }))
                        }
                        _ => Yaml::Mapping(mapping),
                    }
                }
            };
            active.pop();
            yaml
        }
    };
    Ok(yaml)
}

pub fn to_yaml(value: &Value, style: YamlStyle) -> Result<String> {
    let yaml = to_yaml_value(value, style, &mut Vec::new())?;
    Ok(serde_yaml::to_string(&yaml)?)
}

fn from_yaml_key(yaml: serde_yaml::Value) -> Result<Key> {
    use serde_yaml::Value as Yaml;
    match yaml {
        Yaml::String(s) => Ok(Key::Str(s)),
        Yaml::Bool(b) => Ok(Key::Bool(b)),
        Yaml::Number(n) if n.is_i64() => Ok(Key::Int(n.as_i64().unwrap_or_default())),
        other => Err(MunchError::Yaml(format!("unsupported mapping key {:?}", other))),
    }
}

fn from_yaml_value(yaml: serde_yaml::Value, registry: &TagRegistry) -> Result<Value> {
    use serde_yaml::Value as Yaml;
    Ok(match yaml {
        Yaml::Null => Value::None,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::None, Value::Float),
        },
        Yaml::String(s) => Value::Str(s),
        Yaml::Sequence(items) => Value::List(
            items
                .into_iter()
                .map(|item| from_yaml_value(item, registry))
                .collect::<Result<Vec<_>>>()?
                .into(),
        ),
        Yaml::Mapping(mapping) => {
            let dict = Dict::new();
            for (key, item) in mapping {
                dict.insert(from_yaml_key(key)?, from_yaml_value(item, registry)?);
            }
            Value::Dict(dict)
        }
        Yaml::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            let tag = tag.to_string();
            let munch = registry
                .resolve(&tag)
                .ok_or_else(|| MunchError::Yaml(format!("unknown tag {}", tag)))?;
            let Yaml::Mapping(mapping) = value else {
                return Err(MunchError::Yaml(format!("tag {} needs a mapping", tag)));
            };
            for (key, item) in mapping {
                munch.set_item(from_yaml_key(key)?, from_yaml_value(item, registry)?)?;
            }
            Value::Munch(munch)
        }
    })
}

/// Parses YAML into plain values, except that mappings with a registered tag
/// become the container registered for it. Unknown tags are errors.
pub fn load_yaml(text: &str, registry: &TagRegistry) -> Result<Value> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
    from_yaml_value(yaml, registry)
}

pub fn from_yaml(text: &str) -> Result<Value> {
    from_yaml_with(text, &TagRegistry::with_defaults(), Munch::new)
}

/// Loads YAML, then munchifies it with `factory`.
pub fn from_yaml_with<F: Fn() -> Munch>(
    text: &str,
    registry: &TagRegistry,
    factory: F,
) -> Result<Value> {
    munchify_with(&load_yaml(text, registry)?, factory)
}

fn expect_munch(value: Value) -> Result<Munch> {
    let found = value.type_name();
    value.into_munch().ok_or(MunchError::NotAMapping { found })
}

impl Munch {
    pub fn to_json(&self, options: &JsonOptions) -> Result<String> {
        to_json(&Value::Munch(self.clone()), options)
    }
    /// Parses a JSON object into a munch.
    pub fn from_json(text: &str) -> Result<Munch> {
        expect_munch(from_json(text)?)
    }
    pub fn to_yaml(&self, style: YamlStyle) -> Result<String> {
        to_yaml(&Value::Munch(self.clone()), style)
    }
    /// Parses a YAML mapping into a munch, honouring the default tags.
    pub fn from_yaml(text: &str) -> Result<Munch> {
        expect_munch(from_yaml(text)?)
    }
}
