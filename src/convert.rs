//! Structural conversion between plain data and munches.
//!
//! Both directions walk the source graph once, keeping a map from the identity
//! of every visited handle to its counterpart. A counterpart is registered as
//! an empty skeleton before its children are converted, so shared references
//! stay shared and cycles close onto the same object instead of recursing.
//!
//! Tuples are immutable and have no skeleton: their items are converted
//! first and the tuple is built afterwards. A cycle leading back into a tuple
//! that is still being built therefore cannot be closed and is an error.

// identity keyed maps hash pointer addresses, seahash is plenty for that
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::error::{MunchError, Result};
use crate::container::Munch;
use crate::value::{Dict, List, Value};

pub type IdentityHasher = BuildHasherDefault<SeaHasher>;

enum Target<'a> {
    // mappings become whatever the factory makes
    Container(&'a dyn Fn() -> Munch),
    // mappings become plain dicts
    Plain,
}

struct Converter<'a> {
    target: Target<'a>,
    seen: HashMap<usize, Value, IdentityHasher>,
    building: HashSet<usize, IdentityHasher>,
}

impl<'a> Converter<'a> {
    fn new(target: Target<'a>) -> Self {
        Self {
            target,
            seen: HashMap::default(),
            building: HashSet::default(),
        }
    }

    fn convert(&mut self, source: &Value) -> Result<Value> {
        let Some(id) = source.identity() else {
            return Ok(source.clone());
        };
        if let Some(counterpart) = self.seen.get(&id) {
            trace!(id, kind = source.type_name(), "reusing converted object");
            return Ok(counterpart.clone());
        }
        if self.building.contains(&id) {
            return Err(MunchError::TupleCycle);
        }
        let skeleton = self.skeleton(source)?;
        self.seen.insert(id, skeleton.clone());
        self.fill(source, &skeleton)?;
        Ok(skeleton)
    }

    fn skeleton(&mut self, source: &Value) -> Result<Value> {
        Ok(match source {
            Value::Dict(_) | Value::Munch(_) => match &self.target {
                Target::Container(factory) => Value::Munch(factory()),
                Target::Plain => Value::Dict(Dict::new()),
            },
            Value::List(_) => Value::List(List::new()),
            Value::Tuple(tuple) => {
                let id = tuple.identity();
                self.building.insert(id);
                let items = tuple
                    .items()
                    .iter()
                    .map(|item| self.convert(item))
                    .collect::<Result<Vec<_>>>();
                self.building.remove(&id);
                Value::Tuple(tuple.rebuild(items?))
            }
            scalar => scalar.clone(),
        })
    }

    // Tuples are complete once built and are not filled again.
    fn fill(&mut self, source: &Value, skeleton: &Value) -> Result<()> {
        if let Some(items) = source.mapping_items() {
            for (key, value) in items {
                let converted = self.convert(&value)?;
                match skeleton {
                    Value::Munch(munch) => munch.set_item(key, converted)?,
                    Value::Dict(dict) => {
                        dict.insert(key, converted);
                    }
                    _ => (),
                }
            }
        } else if let (Value::List(from), Value::List(into)) = (source, skeleton) {
            for item in from.to_vec() {
                let converted = self.convert(&item)?;
                into.push(converted);
            }
        }
        Ok(())
    }
}

/// Recursively converts mappings into plain munches, lists and tuples into
/// new lists and tuples of converted items. Scalars pass through.
pub fn munchify(value: &Value) -> Result<Value> {
    munchify_with(value, Munch::new)
}

/// Like [`munchify`], with every mapping becoming a container made by
/// `factory`.
pub fn munchify_with<F: Fn() -> Munch>(value: &Value, factory: F) -> Result<Value> {
    let mut converter = Converter::new(Target::Container(&factory));
    let converted = converter.convert(value)?;
    trace!(visited = converter.seen.len(), "munchify complete");
    Ok(converted)
}

/// Recursively converts munches back into plain dicts.
pub fn unmunchify(value: &Value) -> Result<Value> {
    let mut converter = Converter::new(Target::Plain);
    let converted = converter.convert(value)?;
    trace!(visited = converter.seen.len(), "unmunchify complete");
    Ok(converted)
}

/// Nests a mapping whose keys are `sep` joined paths:
/// `{"one.two": 1, "one.three": 2}` becomes `{"one": {"two": 1, "three": 2}}`.
/// Each key is walked on its own, later keys overriding earlier ones.
pub fn flatten_join(flat: &Dict, sep: &str) -> Result<Dict> {
    if sep.is_empty() {
        return Err(MunchError::EmptySeparator);
    }
    let nested = Dict::new();
    for (key, value) in flat.items() {
        let path = key
            .as_str()
            .ok_or_else(|| MunchError::NotAString { key: key.clone() })?;
        let parts: Vec<&str> = path.split(sep).collect();
        let Some((last, parents)) = parts.split_last() else {
            continue;
        };
        let mut node = nested.clone();
        for (depth, part) in parents.iter().enumerate() {
            node = match node.setdefault(*part, Dict::new()) {
                Value::Dict(child) => child,
                _ => {
                    return Err(MunchError::PathConflict {
                        path: parts[..=depth].join(sep),
                    });
                }
            };
        }
        node.insert(*last, value);
    }
    Ok(nested)
}
