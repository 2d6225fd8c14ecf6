use std::cell::Cell;
use std::rc::Rc;

use munch::{Attribute, Factory, List, Munch, Value, dict};

#[test]
fn default_munch_returns_its_default_for_missing_keys() {
    let m = Munch::with_default(0);
    assert_eq!(m.get_item("missing").expect("default"), Value::from(0));
    assert_eq!(m.attr("missing").expect("default"), Value::from(0));
    assert!(!m.contains_key("missing"));

    m.set_item("missing", 5).expect("write");
    assert_eq!(m.get_item("missing").expect("stored"), Value::from(5));
    assert_eq!(m.attr("missing").expect("stored"), Value::from(5));
}

#[test]
fn default_munch_exposes_its_default_as_an_attribute() {
    let m = Munch::with_default(0);
    assert_eq!(m.attr("__default__").expect("intrinsic"), Value::from(0));
    m.set_attr("__default__", "other").expect("default replaced");
    assert_eq!(m.attr("anything").expect("default"), Value::from("other"));
    assert!(m.is_empty());
    // get never consults the default
    assert_eq!(m.get("anything", ()), Value::None);
}

#[test]
fn default_from_dict_applies_the_default_at_every_level() {
    let source = Value::from(dict! {
        "a" => dict! { "b" => 1 },
        "l" => vec![Value::from(dict! { "c" => 2 })],
    });
    let m = Munch::default_from_dict("?", &source).expect("mapping");
    let a = m.attr("a").expect("converted");
    assert_eq!(a.type_name(), "DefaultMunch");
    assert_eq!(a.attr("nope").expect("default"), Value::from("?"));
    let first = m.attr("l").and_then(|l| l.item(0)).expect("list item");
    assert_eq!(first.attr("nope").expect("default"), Value::from("?"));
    assert_eq!(m.attr("nope").expect("default"), Value::from("?"));
}

#[test]
fn factory_munch_vivifies_and_stores_missing_keys() {
    let m = Munch::with_factory(Factory::list());
    let first = m.attr("missing").expect("vivified");
    assert_eq!(first, Value::from(List::new()));
    assert!(m.contains_key("missing"));

    let second = m.attr("missing").expect("stored");
    assert!(first.is_same(&second));

    m.get_item("other").expect("vivified");
    assert_eq!(m.len(), 2);
}

#[test]
fn factory_is_called_once_per_missing_key() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let factory = Factory::new("counted", move || {
        counter.set(counter.get() + 1);
        Value::from(counter.get() as i64)
    });
    let m = Munch::with_factory(factory);
    assert_eq!(m.get_item("a").expect("vivified"), Value::from(1));
    assert_eq!(m.get_item("a").expect("stored"), Value::from(1));
    assert_eq!(m.get_item("b").expect("vivified"), Value::from(2));
    assert_eq!(calls.get(), 2);
    // neither get nor contains_key vivify
    assert_eq!(m.get("c", ()), Value::None);
    assert!(!m.contains_key("c"));
    assert_eq!(calls.get(), 2);
}

#[test]
fn default_factory_is_readable_but_not_writable() {
    let m = Munch::with_factory(Factory::dict());
    match m.get_attr("default_factory").expect("intrinsic") {
        Attribute::Factory(factory) => assert_eq!(factory.name(), "dict"),
        other => panic!("unexpected attribute {:?}", other),
    }
    assert!(m.set_attr("default_factory", 1).unwrap_err().is_attribute_error());
    assert!(m.is_empty());
}

#[test]
fn copy_keeps_the_variant_and_the_same_factory() {
    let factory = Factory::new("zero", || Value::from(0));
    let m = Munch::with_factory(factory.clone());
    m.set_item("nested", dict! { "x" => 1 }).expect("write");
    let copy = m.copy().expect("copied");

    assert!(!copy.ptr_eq(&m));
    assert_eq!(copy, m);
    assert_eq!(copy.type_name(), "DefaultFactoryMunch");
    assert!(copy.default_factory().expect("factory").ptr_eq(&factory));
    let nested = copy.get_item("nested").expect("copied");
    assert_eq!(nested.type_name(), "DefaultFactoryMunch");

    assert_eq!(copy.get_item("fresh").expect("vivified"), Value::from(0));
    assert!(!m.contains_key("fresh"));
}

#[test]
fn copy_of_a_default_munch_keeps_the_default() {
    let m = Munch::with_default("dflt");
    m.set_item("k", 1).expect("write");
    let copy = m.copy().expect("copied");
    assert_eq!(copy.default_value(), Some(Value::from("dflt")));
    assert_eq!(copy.attr("other").expect("default"), Value::from("dflt"));
    assert_eq!(copy, m);
}

#[test]
fn recursive_munch_builds_paths_on_demand() {
    let m = Munch::recursive();
    m.attr("a")
        .and_then(|a| a.attr("b"))
        .and_then(|b| b.set_attr("c", 1))
        .expect("chain of missing attributes");
    let c = m.attr("a").and_then(|a| a.attr("b")).and_then(|b| b.attr("c"));
    assert_eq!(c.expect("written"), Value::from(1));
    assert_eq!(m.attr("a").expect("vivified").type_name(), "RecursiveMunch");
    assert_eq!(
        m.to_dict().expect("plain"),
        dict! { "a" => dict! { "b" => dict! { "c" => 1 } } }
    );
}

#[test]
fn recursive_from_dict_converts_every_level() {
    let source = Value::from(dict! { "a" => dict! { "b" => 1 } });
    let m = Munch::recursive_from_dict(&source).expect("mapping");
    let deeper = m
        .attr("a")
        .and_then(|a| a.attr("new"))
        .and_then(|n| n.attr("deeper"))
        .expect("vivified");
    assert_eq!(deeper.type_name(), "RecursiveMunch");
}
