//! Munch – an insertion ordered dictionary whose keys double as attributes.
//!
//! A [`Munch`] holds a dynamically typed value graph ([`Value`]) and lets the
//! same entry be reached as an item (`m.get_item("a")`) or as an attribute
//! (`m.attr("a")`). Attribute access follows a fixed lookup order:
//! * a per-instance attribute slot written earlier,
//! * an intrinsic member such as `keys` or `to_dict` ([`attr::Member`]),
//! * a mapping key,
//! * the munch's miss policy.
//!
//! ## Variants
//! All variants are one container type with a [`container::Variant`] tag and a
//! [`policy::MissPolicy`]:
//! * `Munch` fails on absent keys.
//! * `AutoMunch` additionally turns plain dicts assigned as attributes into munches.
//! * `DefaultMunch` returns a fixed default for absent keys.
//! * `DefaultFactoryMunch` stores `factory()` under an absent key on lookup.
//! * `RecursiveMunch` does the same with new recursive munches, so
//!   `m.attr("a")?.attr("b")?.set_attr("c", 1)` works on an empty munch.
//!
//! ## Conversion
//! [`munchify`] and [`unmunchify`] convert between plain dicts and munches
//! recursively. Shared objects stay shared and cycles are reproduced, since
//! every converted object is registered before its children are visited.
//! [`flatten_join`] nests documents with compound keys such as `"a.b"`.
//!
//! ## Text
//! * [`repr`] writes Python-literal text and [`parse::parse_repr`] reads it back.
//! * [`serial`] encodes JSON through serde_json and YAML through serde_yaml,
//!   with an explicit [`serial::TagRegistry`] for tagged YAML.
//! * [`state`] captures and restores the contents of a munch.
//!
//! ## Quick Start
//! ```
//! use munch::{munch, Munch, Value, munchify, unmunchify};
//! let m = munch! { "name" => "Ada", "langs" => vec!["en", "fr"] };
//! assert_eq!(m.attr("name").unwrap(), Value::from("Ada"));
//! m.set_attr("born", 1815).unwrap();
//! assert_eq!(m.get_item("born").unwrap(), Value::from(1815));
//! let plain = unmunchify(&Value::from(m.clone())).unwrap();
//! let again = munchify(&plain).unwrap();
//! assert_eq!(again, Value::from(m));
//! ```
//!
//! Values are reference counted (`Rc`) and therefore bound to one thread.
//! A cyclic graph is not freed until one of its links is removed.

pub mod attr;
pub mod container;
pub mod convert;
pub mod error;
pub mod parse;
pub mod policy;
pub mod repr;
pub mod serial;
pub mod settings;
pub mod state;
pub mod value;

pub use attr::{Attribute, Member};
pub use container::{KeyGuard, Munch, Variant};
pub use convert::{flatten_join, munchify, munchify_with, unmunchify};
pub use error::{MunchError, Result};
pub use parse::{FactoryRegistry, ReprReader, parse_repr};
pub use policy::{Factory, MissPolicy};
pub use repr::repr;
pub use serial::{JsonOptions, TagRegistry, YamlStyle};
pub use settings::Settings;
pub use state::State;
pub use value::{Dict, Key, List, Tuple, Value};

/// Builds a [`Munch`] from `key => value` pairs, in order.
#[macro_export]
macro_rules! munch {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let pairs: ::std::vec::Vec<($crate::Key, $crate::Value)> =
            ::std::vec![$(($crate::Key::from($key), $crate::Value::from($value))),*];
        pairs.into_iter().collect::<$crate::Munch>()
    }};
}

/// Builds a plain [`Dict`] from `key => value` pairs, in order.
#[macro_export]
macro_rules! dict {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let pairs: ::std::vec::Vec<($crate::Key, $crate::Value)> =
            ::std::vec![$(($crate::Key::from($key), $crate::Value::from($value))),*];
        pairs.into_iter().collect::<$crate::Dict>()
    }};
}

/// Builds a [`List`] of values.
#[macro_export]
macro_rules! list {
    ($($value:expr),* $(,)?) => {{
        let items: ::std::vec::Vec<$crate::Value> = ::std::vec![$($crate::Value::from($value)),*];
        $crate::List::from(items)
    }};
}
