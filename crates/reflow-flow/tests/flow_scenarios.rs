use std::cell::{Cell, RefCell};
use std::rc::Rc;

use reflow_core::{Element, Runtime, RuntimeConfig, Text, disposable_effect, on_unmount};
use reflow_flow::*;

#[test]
fn conditional_scenarios() {
    let mut rt = Runtime::new();

    let frame = rt.compose(|| IfElse(true, Text("A"), Text("B")));
    assert_eq!(frame.root.texts(), vec!["A"]);

    let frame = rt.compose(|| IfElse(Test::when(|| false), Text("A"), Text("B")));
    assert_eq!(frame.root.texts(), vec!["B"]);

    for falsy in [Prop::Null, Prop::from(""), Prop::from(f64::NAN), Prop::Undefined] {
        let frame = rt.compose(|| IfElse(&falsy, Text("A"), Text("B")));
        assert_eq!(frame.root.texts(), vec!["B"], "{falsy:?}");
    }
}

#[test]
fn list_map_doubles_in_order() {
    let mut rt = Runtime::new();
    let frame = rt.compose(|| Map(&[1, 2, 3], |x, _, _| Text((x * 2).to_string())));
    insta::assert_snapshot!(frame.root.dump(), @r#"
    <>
      "2"
      "4"
      "6"
    "#);
}

#[test]
fn switch_is_order_sensitive() {
    let mut rt = Runtime::new();
    let first = Rc::new(Cell::new(true));
    let later_tests = Rc::new(Cell::new(0));

    let build = {
        let first = first.clone();
        let later_tests = later_tests.clone();
        move || {
            let later_tests = later_tests.clone();
            Switch([
                Case::from(Element("header")),
                When(first.get(), Text("first")),
                When(
                    Test::when(move || {
                        later_tests.set(later_tests.get() + 1);
                        true
                    }),
                    Text("second"),
                ),
            ])
        }
    };

    let frame = rt.compose(build.clone());
    assert_eq!(frame.root.texts(), vec!["first"]);
    assert_eq!(later_tests.get(), 0);

    first.set(false);
    let frame = rt.compose(build);
    assert_eq!(frame.root.texts(), vec!["second"]);
    assert_eq!(later_tests.get(), 1);
}

#[test]
fn switch_without_match_renders_nothing() {
    let mut rt = Runtime::new();
    let frame = rt.compose(|| Switch([When(false, Text("a")), When(Prop::from(0), Text("b"))]));
    assert!(frame.root.is_empty());
}

#[test]
fn keyed_map_keeps_state_with_items() {
    let mut rt = Runtime::new();
    let order = Rc::new(RefCell::new(vec!["x", "y"]));
    let disposed = Rc::new(Cell::new(0));

    let build = {
        let order = order.clone();
        let disposed = disposed.clone();
        move || {
            let items = order.borrow().clone();
            MapKeyed(&items, |s| *s, |s, _, _| {
                let disposed = disposed.clone();
                disposable_effect((), move || {
                    on_unmount(move || disposed.set(disposed.get() + 1))
                });
                Text(*s)
            })
        }
    };

    let frame = rt.compose(build.clone());
    insta::assert_snapshot!(frame.root.dump(), @r#"
    <>
      "x" #x
      "y" #y
    "#);

    *order.borrow_mut() = vec!["y", "x"];
    rt.compose(build.clone());
    assert_eq!(disposed.get(), 0);

    *order.borrow_mut() = vec!["y"];
    rt.compose(build);
    assert_eq!(disposed.get(), 1);
}

#[test]
fn nested_flow_tree() {
    let mut rt = Runtime::new();
    let frame = rt.compose(|| {
        Element("section").with_children(vec![
            IfElse(true, Text("shown"), Text("hidden")),
            Memo(&[Prop::from("k")], Render::lazy(|| Element("cached"))),
            Map(&["a", "b"], |s, i, _| Text(format!("{i}:{s}"))),
        ])
    });
    insta::assert_snapshot!(frame.root.dump(), @r#"
    section
      "shown"
      cached
      <>
        "0:a"
        "1:b"
    "#);
}

#[test]
fn try_catch_inside_list_isolates_the_failing_row() {
    let mut rt = Runtime::with_config(RuntimeConfig {
        log_caught_panics: false,
        ..Default::default()
    });
    let frame = rt.compose(|| {
        Map(&[1, 0, 2], |n, _, _| {
            let n = *n;
            TryCatch::new(Render::lazy(move || {
                if n == 0 {
                    panic!("zero row");
                }
                Text(format!("row {n}"))
            }))
            .catch_with(|err| Text(format!("failed: {}", err.message)))
            .view()
        })
    });
    assert_eq!(frame.root.texts(), vec!["row 1", "failed: zero row", "row 2"]);
}

#[test]
fn shallow_equal_properties() {
    let obj = Prop::object([("a", Prop::from(1)), ("b", Prop::from("two"))]);
    assert!(shallow_equal(&obj, &obj));
    assert!(shallow_equal(&Prop::from(f64::NAN), &Prop::from(f64::NAN)));
    assert!(shallow_equal(
        &obj,
        &Prop::object([("b", Prop::from("two")), ("a", Prop::from(1))])
    ));
    assert!(!shallow_equal(&obj, &Prop::object([("a", 1)])));
}
