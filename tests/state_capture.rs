use munch::{Factory, Key, Munch, MunchError, State, Value, munch};

#[test]
fn capture_lists_entries_in_order() {
    let m = munch! { "a" => 1, "b" => "two" };
    let state = m.capture_state();
    assert_eq!(
        state,
        State::Contents(vec![(Key::from("a"), Value::from(1)), (Key::from("b"), Value::from("two"))])
    );
    assert_eq!(state.default(), None);
}

#[test]
fn restore_replaces_stale_entries() {
    let source = munch! { "a" => 1, "b" => 2 };
    let target = munch! { "stale" => true };
    target.restore_state(source.capture_state()).expect("restores");
    assert_eq!(target, source);
    assert!(!target.contains_key("stale"));
}

#[test]
fn restore_into_a_blank_munch_makes_an_equal_munch() {
    let source = munch! { "nested" => munch! { "x" => 1 } };
    let blank = Munch::new();
    blank.restore_state(source.capture_state()).expect("restores");
    assert_eq!(blank, source);
    // capture is shallow, nested handles are shared
    let a = source.get_item("nested").expect("nested");
    let b = blank.get_item("nested").expect("nested");
    assert!(a.is_same(&b));
}

#[test]
fn default_munch_state_carries_the_default() {
    let source = Munch::with_default(Value::from("?"));
    source.set_item("a", 1).expect("sets");
    let state = source.capture_state();
    assert_eq!(state.default(), Some(&Value::from("?")));
    assert_eq!(state.contents().len(), 1);

    let target = Munch::with_default(Value::None);
    target.restore_state(state).expect("restores");
    assert_eq!(target.default_value(), Some(Value::from("?")));
    assert_eq!(target.attr("missing").expect("default"), Value::from("?"));
    assert_eq!(target.get_item("a").expect("a"), Value::from(1));
}

#[test]
fn factory_munch_keeps_its_factory() {
    let source = Munch::with_factory(Factory::list());
    source.set_item("a", 1).expect("sets");
    let target = Munch::with_factory(Factory::dict());
    target.restore_state(source.capture_state()).expect("restores");
    assert_eq!(target.default_factory().map(|f| f.name().to_owned()), Some("dict".to_owned()));
    assert_eq!(target.len(), 1);
}

#[test]
fn mismatched_state_is_refused() {
    let plain = Munch::new();
    let with_default = State::WithDefault {
        default: Value::None,
        contents: Vec::new(),
    };
    assert!(matches!(plain.restore_state(with_default), Err(MunchError::State(_))));

    let defaulting = Munch::with_default(0);
    defaulting.set_item("kept", 1).expect("sets");
    let contents = State::Contents(Vec::new());
    assert!(matches!(defaulting.restore_state(contents), Err(MunchError::State(_))));
    // a refused state leaves the munch untouched
    assert_eq!(defaulting.get_item("kept").expect("kept"), Value::from(1));
}
