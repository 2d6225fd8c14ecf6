use munch::{Attribute, Dict, Key, Member, Munch, MunchError, Value, dict, munch};

#[test]
fn items_and_attributes_are_the_same_entry() {
    let m = Munch::new();
    m.set_item("hello", "world").expect("item write");
    assert_eq!(m.attr("hello").expect("attribute read"), Value::from("world"));
    m.set_attr("answer", 42).expect("attribute write");
    assert_eq!(m.get_item("answer").expect("item read"), Value::from(42));
    assert_eq!(m.keys(), vec![Key::from("hello"), Key::from("answer")]);
}

#[test]
fn missing_attribute_is_an_attribute_error() {
    let m = munch! { "bar" => "baz" };
    let err = m.attr("foo").unwrap_err();
    assert_eq!(err, MunchError::Attribute("foo".to_owned()));
    assert_eq!(err.to_string(), "foo");
    assert!(m.get_item("foo").unwrap_err().is_key_error());
    assert!(!m.has_attr("foo"));
    assert!(m.has_attr("bar"));
}

#[test]
fn attribute_reads_share_the_stored_object() {
    let m = munch! { "lol" => Dict::new() };
    let by_attr = m.attr("lol").expect("present");
    let by_item = m.get_item("lol").expect("present");
    assert!(by_attr.is_same(&by_item));
}

#[test]
fn members_shadow_keys_on_the_attribute_path_only() {
    let m = munch! { "values" => 1 };
    assert!(matches!(
        m.get_attr("values").expect("member"),
        Attribute::Method(Member::Values)
    ));
    assert!(m.attr("values").unwrap_err().is_attribute_error());
    assert_eq!(m.get_item("values").expect("key still reachable"), Value::from(1));
}

#[test]
fn writing_a_member_name_sets_an_instance_slot() {
    let m = Munch::new();
    m.set_attr("values", "uh oh").expect("slot write");
    assert_eq!(m.attr("values").expect("slot read"), Value::from("uh oh"));
    assert!(m.get_item("values").unwrap_err().is_key_error());
    assert!(m.is_empty());

    m.del_attr("values").expect("slot removed");
    assert!(matches!(
        m.get_attr("values").expect("member again"),
        Attribute::Method(Member::Values)
    ));
    assert!(m.del_attr("values").unwrap_err().is_attribute_error());
}

#[test]
fn deleting_attributes() {
    let m = munch! { "lol" => 42 };
    m.del_attr("lol").expect("deleted");
    assert_eq!(m.attr("lol").unwrap_err(), MunchError::Attribute("lol".to_owned()));
    assert_eq!(m.del_attr("lol").unwrap_err(), MunchError::Attribute("lol".to_owned()));
}

#[test]
fn rejected_writes_surface_as_attribute_errors() {
    let m = Munch::new();
    m.set_key_guard(|key| match key.as_str() {
        Some(name) if name.starts_with('_') => Err("reserved".to_owned()),
        _ => Ok(()),
    });
    assert!(matches!(
        m.set_item("_secret", 1).unwrap_err(),
        MunchError::Rejected { .. }
    ));
    assert_eq!(
        m.set_attr("_secret", 1).unwrap_err(),
        MunchError::Attribute("_secret".to_owned())
    );
    m.set_attr("public", 1).expect("allowed");
    assert_eq!(m.len(), 1);
}

#[test]
fn attributes_chain_through_nested_munches() {
    let source = dict! { "a" => dict! { "b" => dict! { "c" => 1 } } };
    let m = Munch::from_dict(&Value::from(source)).expect("mapping");
    let b = m.attr("a").and_then(|a| a.attr("b")).expect("nested");
    b.set_attr("d", 2).expect("write through the chain");
    let d = m.attr("a").and_then(|a| a.attr("b")).and_then(|b| b.attr("d"));
    assert_eq!(d.expect("written"), Value::from(2));
    assert!(Value::from(3).attr("x").unwrap_err().is_attribute_error());
    assert!(Value::from(3).set_attr("x", 1).unwrap_err().is_attribute_error());
}

#[test]
fn dict_operations_keep_insertion_order() {
    let m = munch! { "a" => 1, "b" => 2, "c" => 3 };
    m.set_item("a", 10).expect("overwrite");
    assert_eq!(m.keys(), vec![Key::from("a"), Key::from("b"), Key::from("c")]);
    assert_eq!(m.del_item("b").expect("present"), Value::from(2));
    assert_eq!(m.popitem(), Some((Key::from("c"), Value::from(3))));
    assert_eq!(m.setdefault("z", 0).expect("set"), Value::from(0));
    assert_eq!(m.setdefault("a", 0).expect("kept"), Value::from(10));
    assert_eq!(m.get("missing", "fallback"), Value::from("fallback"));
    assert!(m.pop("missing").unwrap_err().is_key_error());

    m.update_from(&Value::from(dict! { "a" => 1, "n" => () })).expect("mapping");
    assert_eq!(m.keys(), vec![Key::from("a"), Key::from("z"), Key::from("n")]);
    assert_eq!(m.values(), vec![Value::from(1), Value::from(0), Value::None]);
    assert!(matches!(
        m.update_from(&Value::from(5)),
        Err(MunchError::NotAMapping { found: "int" })
    ));

    m.clear();
    assert!(m.is_empty());
}

#[test]
fn equality_ignores_order_and_variant() {
    let a = munch! { "x" => 1, "y" => 2 };
    let b = munch! { "y" => 2, "x" => 1 };
    assert_eq!(a, b);
    assert_eq!(Value::from(a.clone()), Value::from(dict! { "x" => 1, "y" => 2.0 }));

    let d = Munch::with_default(0);
    d.update([("x", 1), ("y", 2)]).expect("plain keys");
    assert_eq!(a, d);
    d.set_item("z", 3).expect("plain key");
    assert_ne!(a, d);
}

#[test]
fn auto_munch_converts_assigned_dicts() {
    let m = Munch::auto();
    m.set_attr("inner", dict! { "deep" => dict! { "x" => 1 } })
        .expect("attribute write");
    let inner = m.attr("inner").expect("stored");
    assert_eq!(inner.type_name(), "AutoMunch");
    let deep = inner.attr("deep").expect("converted recursively");
    assert_eq!(deep.type_name(), "AutoMunch");
    assert_eq!(deep.attr("x").expect("leaf"), Value::from(1));

    m.set_item("raw", dict! {}).expect("item write");
    assert_eq!(m.get_item("raw").expect("stored").type_name(), "dict");
}

#[test]
fn dir_lists_members_and_identifier_keys() {
    let m = munch! { "name" => 1, "not an identifier" => 2, 7 => 3 };
    let names = m.dir();
    assert!(names.iter().any(|n| n == "keys"));
    assert!(names.iter().any(|n| n == "name"));
    assert!(!names.iter().any(|n| n == "not an identifier"));
}

#[test]
fn dunder_dict_is_a_plain_copy() {
    let m = munch! { "a" => munch! { "b" => 1 } };
    let plain = m.attr("__dict__").expect("intrinsic");
    assert_eq!(plain.type_name(), "dict");
    assert_eq!(plain.item("a").expect("nested").type_name(), "dict");
    assert_eq!(plain, Value::from(m));
}

#[test]
fn dunder_dict_is_read_only() {
    let m = munch! { "a" => 1 };
    assert_eq!(
        m.set_attr("__dict__", dict! { "b" => 2 }).unwrap_err(),
        MunchError::Attribute("__dict__".to_owned())
    );
    let plain = m.attr("__dict__").expect("still computed");
    assert_eq!(plain, Value::from(dict! { "a" => 1 }));
    assert!(!m.contains_key("__dict__"));
}

#[test]
fn negative_indexes_count_from_the_end() {
    let m = munch! { "l" => vec![1, 2, 3] };
    let l = m.attr("l").expect("present");
    assert_eq!(l.item(-1).expect("last"), Value::from(3));
    assert_eq!(l.item(-3).expect("first"), Value::from(1));
    assert!(l.item(-4).unwrap_err().is_key_error());
    assert!(l.item(3).unwrap_err().is_key_error());
}
