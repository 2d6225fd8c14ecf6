use munch::{Dict, Key, MunchError, Value, dict, flatten_join, munchify};

#[test]
fn dotted_keys_become_nested_dicts() {
    let flat = dict! { "one.two" => 1, "one.three" => 2, "two.one" => 3 };
    let nested = flatten_join(&flat, ".").expect("nests");
    let expected = dict! {
        "one" => dict! { "two" => 1, "three" => 2 },
        "two" => dict! { "one" => 3 },
    };
    assert_eq!(nested, expected);
    assert_eq!(nested.keys(), vec![Key::from("one"), Key::from("two")]);
}

#[test]
fn keys_without_separator_stay_at_the_top() {
    let flat = dict! { "name" => "x", "db.port" => 5432 };
    let nested = flatten_join(&flat, ".").expect("nests");
    assert_eq!(nested.get("name"), Some(Value::from("x")));
    let db = nested.get("db").expect("db");
    assert_eq!(db.item("port").expect("port"), Value::from(5432));
}

#[test]
fn custom_separator() {
    let flat = dict! { "server__host" => "localhost", "server__port" => 80, "a.b" => 1 };
    let nested = flatten_join(&flat, "__").expect("nests");
    let server = nested.get("server").expect("server");
    assert_eq!(server.item("host").expect("host"), Value::from("localhost"));
    // the dot is not a separator here
    assert_eq!(nested.get("a.b"), Some(Value::from(1)));
}

#[test]
fn sibling_paths_share_their_parent() {
    let flat = dict! { "a.b" => 1, "a.c" => 3 };
    let nested = flatten_join(&flat, ".").expect("nests");
    let a = nested.get("a").expect("a");
    assert_eq!(a.item("b").expect("b"), Value::from(1));
    assert_eq!(a.item("c").expect("c"), Value::from(3));
    assert_eq!(nested.len(), 1);
}

#[test]
fn non_string_keys_are_refused() {
    let flat = dict! { 1 => "one" };
    match flatten_join(&flat, ".") {
        Err(MunchError::NotAString { key }) => assert_eq!(key, Key::Int(1)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn a_scalar_in_the_way_is_a_conflict() {
    let flat = dict! { "a" => 1, "a.b" => 2 };
    match flatten_join(&flat, ".") {
        Err(MunchError::PathConflict { path }) => assert_eq!(path, "a"),
        other => panic!("unexpected {:?}", other),
    }
    let deeper = dict! { "x.y" => 1, "x.y.z" => 2 };
    match flatten_join(&deeper, ".") {
        Err(MunchError::PathConflict { path }) => assert_eq!(path, "x.y"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn empty_separator_is_refused() {
    let flat = dict! { "a" => 1 };
    assert_eq!(flatten_join(&flat, "").err(), Some(MunchError::EmptySeparator));
}

#[test]
fn empty_input_gives_empty_output() {
    let nested = flatten_join(&Dict::new(), ".").expect("nests");
    assert!(nested.is_empty());
}

#[test]
fn nested_result_munchifies() {
    let flat = dict! { "one.two" => 1, "one.three" => 2 };
    let nested = flatten_join(&flat, ".").expect("nests");
    let m = munchify(&Value::from(nested)).expect("converts");
    let two = m.attr("one").and_then(|one| one.attr("two"));
    assert_eq!(two.expect("one.two"), Value::from(1));
}
