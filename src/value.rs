//! The dynamic value graph held by munches.
//!
//! Scalars are plain data. `List`, `Dict` and `Munch` are shared mutable
//! handles and `Tuple` is a shared immutable handle, so cloning any of them
//! clones the handle, not the object behind it. Identity of a handle (the
//! `is` of the conversion algorithms) is the address of its allocation.
//!
//! Graphs may be cyclic. Since handles are reference counted, a cycle keeps
//! itself alive until one of its links is removed.

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::container::Munch;
use crate::convert::IdentityHasher;
use crate::error::{MunchError, Result};
use crate::repr;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// True when `name` could be written as an attribute or a named tuple field.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

// ------------- Key -------------
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Key {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }
}
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&repr::key_repr(self))
    }
}
impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_owned())
    }
}
impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}
impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::Str(s.clone())
    }
}
impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}
impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}
impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i as i64)
    }
}
impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

// ------------- List -------------
#[derive(Clone, Default)]
pub struct List(Rc<RefCell<Vec<Value>>>);

impl List {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }
    /// Replaces the element at `index`, returning false when out of range.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> bool {
        match self.0.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
    /// Snapshot of the elements (handles are shared, not copied).
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }
    pub fn ptr_eq(&self, other: &List) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
    pub(crate) fn borrow(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }
    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}
impl From<Vec<Value>> for List {
    fn from(values: Vec<Value>) -> Self {
        List(Rc::new(RefCell::new(values)))
    }
}
impl<V: Into<Value>> FromIterator<V> for List {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        List::from(iter.into_iter().map(Into::into).collect::<Vec<_>>())
    }
}
impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        Comparison::default().values(&Value::List(self.clone()), &Value::List(other.clone()))
    }
}

// ------------- Dict -------------
/// A plain insertion ordered mapping, the counterpart of a munch without
/// attribute access.
#[derive(Clone, Default)]
pub struct Dict(Rc<RefCell<IndexMap<Key, Value>>>);

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.0.borrow_mut().insert(key.into(), value.into())
    }
    pub fn get(&self, key: impl Into<Key>) -> Option<Value> {
        self.0.borrow().get(&key.into()).cloned()
    }
    pub fn remove(&self, key: impl Into<Key>) -> Option<Value> {
        self.0.borrow_mut().shift_remove(&key.into())
    }
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.0.borrow().contains_key(&key.into())
    }
    /// Inserts `default` when `key` is absent and returns the current value.
    pub fn setdefault(&self, key: impl Into<Key>, default: impl Into<Value>) -> Value {
        self.0
            .borrow_mut()
            .entry(key.into())
            .or_insert_with(|| default.into())
            .clone()
    }
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
    pub fn keys(&self) -> Vec<Key> {
        self.0.borrow().keys().cloned().collect()
    }
    pub fn values(&self) -> Vec<Value> {
        self.0.borrow().values().cloned().collect()
    }
    pub fn items(&self) -> Vec<(Key, Value)> {
        self.0
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
    pub fn ptr_eq(&self, other: &Dict) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
    pub(crate) fn borrow(&self) -> Ref<'_, IndexMap<Key, Value>> {
        self.0.borrow()
    }
    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}
impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Dict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<IndexMap<_, _>>();
        Dict(Rc::new(RefCell::new(map)))
    }
}
impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        Comparison::default().values(&Value::Dict(self.clone()), &Value::Dict(other.clone()))
    }
}

// ------------- Tuple -------------
/// The "type" of a named tuple: its name and field names. Rebuilding a tuple
/// with the same shape is what `_make` does for named tuples.
#[derive(Debug, PartialEq, Eq)]
pub struct Shape {
    name: String,
    fields: Vec<String>,
}

struct TupleData {
    shape: Option<Rc<Shape>>,
    items: Vec<Value>,
}

#[derive(Clone)]
pub struct Tuple(Rc<TupleData>);

impl Tuple {
    pub fn new(items: Vec<Value>) -> Self {
        Tuple(Rc::new(TupleData { shape: None, items }))
    }
    /// Builds a named tuple. Field names must be identifiers, unique, and
    /// match the number of items.
    pub fn named(name: &str, fields: &[&str], items: Vec<Value>) -> Result<Self> {
        if !is_identifier(name) {
            return Err(MunchError::NamedTuple(format!("'{}' is not a valid type name", name)));
        }
        for (i, field) in fields.iter().enumerate() {
            if !is_identifier(field) {
                return Err(MunchError::NamedTuple(format!("'{}' is not a valid field name", field)));
            }
            if fields[..i].contains(field) {
                return Err(MunchError::NamedTuple(format!("duplicate field name '{}'", field)));
            }
        }
        if fields.len() != items.len() {
            return Err(MunchError::NamedTuple(format!(
                "{} expects {} items, got {}",
                name,
                fields.len(),
                items.len()
            )));
        }
        let shape = Shape {
            name: name.to_owned(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        };
        Ok(Tuple(Rc::new(TupleData {
            shape: Some(Rc::new(shape)),
            items,
        })))
    }
    pub fn name(&self) -> Option<&str> {
        self.0.shape.as_ref().map(|s| s.name.as_str())
    }
    pub fn fields(&self) -> Option<&[String]> {
        self.0.shape.as_ref().map(|s| s.fields.as_slice())
    }
    pub fn field(&self, name: &str) -> Option<&Value> {
        let shape = self.0.shape.as_ref()?;
        let index = shape.fields.iter().position(|f| f == name)?;
        self.0.items.get(index)
    }
    pub fn items(&self) -> &[Value] {
        &self.0.items
    }
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.items.get(index)
    }
    pub fn len(&self) -> usize {
        self.0.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.items.is_empty()
    }
    pub fn ptr_eq(&self, other: &Tuple) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
    /// A new tuple of the same shape holding `items`.
    pub(crate) fn rebuild(&self, items: Vec<Value>) -> Tuple {
        Tuple(Rc::new(TupleData {
            shape: self.0.shape.clone(),
            items,
        }))
    }
    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}
impl PartialEq for Tuple {
    // like named tuples, the shape does not take part in equality
    fn eq(&self, other: &Self) -> bool {
        Comparison::default().values(&Value::Tuple(self.clone()), &Value::Tuple(other.clone()))
    }
}

// ------------- Value -------------
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(List),
    Tuple(Tuple),
    Dict(Dict),
    Munch(Munch),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Munch(m) => m.type_name(),
        }
    }
    /// Address of the shared object behind a handle; scalars have none.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Value::List(l) => Some(l.identity()),
            Value::Tuple(t) => Some(t.identity()),
            Value::Dict(d) => Some(d.identity()),
            Value::Munch(m) => Some(m.identity()),
            _ => None,
        }
    }
    /// Identity comparison: true only when both values are handles to the
    /// same object.
    pub fn is_same(&self, other: &Value) -> bool {
        matches!((self.identity(), other.identity()), (Some(a), Some(b)) if a == b)
    }
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Dict(_) | Value::Munch(_))
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }
    pub fn as_tuple(&self) -> Option<&Tuple> {
        match self {
            Value::Tuple(t) => Some(t),
            _ => None,
        }
    }
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }
    pub fn as_munch(&self) -> Option<&Munch> {
        match self {
            Value::Munch(m) => Some(m),
            _ => None,
        }
    }
    pub fn into_munch(self) -> Option<Munch> {
        match self {
            Value::Munch(m) => Some(m),
            _ => None,
        }
    }
    /// Snapshot of the entries when this value is a mapping.
    pub fn mapping_items(&self) -> Option<Vec<(Key, Value)>> {
        match self {
            Value::Dict(d) => Some(d.items()),
            Value::Munch(m) => Some(m.items()),
            _ => None,
        }
    }

    /// Attribute read, chainable: `v.attr("a")?.attr("b")`. Munches resolve
    /// through their attribute dispatch and named tuples by field name.
    /// Anything else has no attributes.
    pub fn attr(&self, name: &str) -> Result<Value> {
        match self {
            Value::Munch(m) => m.attr(name),
            Value::Tuple(t) => t
                .field(name)
                .cloned()
                .ok_or_else(|| MunchError::Attribute(name.to_owned())),
            _ => Err(MunchError::Attribute(name.to_owned())),
        }
    }
    pub fn set_attr(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        match self {
            Value::Munch(m) => m.set_attr(name, value),
            _ => Err(MunchError::Attribute(name.to_owned())),
        }
    }
    /// Item read on mappings, lists and tuples. Negative indexes count from
    /// the end of a sequence.
    pub fn item(&self, key: impl Into<Key>) -> Result<Value> {
        let key = key.into();
        if let Value::Munch(m) = self {
            return m.get_item(key);
        }
        let found = match (self, &key) {
            (Value::Dict(d), _) => d.get(&key),
            (Value::List(l), Key::Int(i)) => position(*i, l.len()).and_then(|i| l.get(i)),
            (Value::Tuple(t), Key::Int(i)) => position(*i, t.len()).and_then(|i| t.get(i).cloned()),
            _ => None,
        };
        found.ok_or(MunchError::Key(key))
    }
}

// index into a sequence of `len` items, negative from the end
fn position(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 { len as i64 + index } else { index };
    usize::try_from(resolved).ok().filter(|i| *i < len)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        Comparison::default().values(self, other)
    }
}

/// Structural equality over possibly cyclic graphs. Mappings compare as
/// dictionaries: same keys, equal values, order ignored. A pair of containers
/// met again while still being compared is taken as equal, so two cycles of
/// the same shape compare equal instead of recursing forever.
#[derive(Default)]
pub(crate) struct Comparison {
    assumed: HashSet<(usize, usize), IdentityHasher>,
}

impl Comparison {
    pub(crate) fn values(&mut self, a: &Value, b: &Value) -> bool {
        if a.is_same(b) {
            return true;
        }
        if let (Some(x), Some(y)) = (a.identity(), b.identity()) {
            if !self.assumed.insert((x, y)) {
                return true;
            }
        }
        match (a, b) {
            (Value::None, Value::None) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Int(x), Value::Int(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => x == y,
            (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::List(x), Value::List(y)) => self.sequences(&x.borrow(), &y.borrow()),
            (Value::Tuple(x), Value::Tuple(y)) => self.sequences(x.items(), y.items()),
            (Value::Dict(x), Value::Dict(y)) => self.mappings(&x.borrow(), &y.borrow()),
            (Value::Munch(x), Value::Munch(y)) => self.mappings(&x.entries(), &y.entries()),
            (Value::Dict(d), Value::Munch(m)) | (Value::Munch(m), Value::Dict(d)) => {
                self.mappings(&d.borrow(), &m.entries())
            }
            _ => false,
        }
    }

    fn sequences(&mut self, a: &[Value], b: &[Value]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.values(x, y))
    }

    fn mappings(&mut self, a: &IndexMap<Key, Value>, b: &IndexMap<Key, Value>) -> bool {
        a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| self.values(v, w)))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&repr::repr(self))
    }
}
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&repr::repr(self))
    }
}
impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&repr::repr(&Value::List(self.clone())))
    }
}
impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&repr::repr(&Value::Dict(self.clone())))
    }
}
impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&repr::repr(&Value::Tuple(self.clone())))
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::None
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}
impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}
impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}
impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
impl From<Key> for Value {
    fn from(k: Key) -> Self {
        match k {
            Key::Bool(b) => Value::Bool(b),
            Key::Int(i) => Value::Int(i),
            Key::Str(s) => Value::Str(s),
        }
    }
}
impl From<List> for Value {
    fn from(l: List) -> Self {
        Value::List(l)
    }
}
impl From<Tuple> for Value {
    fn from(t: Tuple) -> Self {
        Value::Tuple(t)
    }
}
impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(d)
    }
}
impl From<Munch> for Value {
    fn from(m: Munch) -> Self {
        Value::Munch(m)
    }
}
impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().collect())
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Value::None, Into::into)
    }
}
