use crate::Prop;

/// One-level structural equality.
///
/// Two values are shallow-equal when they are the same value, or when both
/// are objects or arrays with the same number of entries and every entry of
/// `a` has a same-valued counterpart in `b`. Arrays are keyed by index, so
/// `[1]` equals `{"0": 1}`. Key order is ignored; nested values are compared
/// by identity, not recursively.
pub fn shallow_equal(a: &Prop, b: &Prop) -> bool {
    if a.same_value(b) {
        return true;
    }

    match (a, b) {
        (Prop::Object(x), Prop::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| v.same_value(w)))
        }
        (Prop::Array(x), Prop::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(v, w)| v.same_value(w))
        }
        (Prop::Array(items), Prop::Object(map)) | (Prop::Object(map), Prop::Array(items)) => {
            items.len() == map.len()
                && items.iter().enumerate().all(|(i, v)| {
                    map.get(&i.to_string())
                        .is_some_and(|w| v.same_value(w))
                })
        }
        _ => false,
    }
}

/// Purity check used by `Bare::pure_by`.
///
/// Two arrays differ when their lengths differ or when any element is not
/// shallow-equal to the element at the same index. Anything else is compared
/// with a single top-level [`shallow_equal`].
pub fn shallow_different(prev: &Prop, next: &Prop) -> bool {
    match (prev.as_array(), next.as_array()) {
        (Some(prev), Some(next)) => {
            prev.len() != next.len()
                || next
                    .iter()
                    .zip(prev.iter())
                    .any(|(n, p)| !shallow_equal(p, n))
        }
        _ => !shallow_equal(prev, next),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn reflexive() {
        let values = [
            Prop::Undefined,
            Prop::from(f64::NAN),
            Prop::from("a"),
            Prop::object([("a", 1)]),
            Prop::array([1, 2]),
        ];
        for v in &values {
            assert!(shallow_equal(v, v), "{v:?}");
        }
    }

    #[test]
    fn objects_ignore_key_order() {
        let a = Prop::object([("a", Prop::from(1)), ("b", Prop::from("x"))]);
        let b = Prop::object([("b", Prop::from("x")), ("a", Prop::from(1))]);
        assert!(shallow_equal(&a, &b));
    }

    #[test]
    fn objects_with_different_key_counts_differ() {
        let a = Prop::object([("a", 1)]);
        let b = Prop::object([("a", 1), ("b", 2)]);
        assert!(!shallow_equal(&a, &b));
        assert!(!shallow_equal(&b, &a));
    }

    #[test]
    fn objects_with_different_keys_differ() {
        let a = Prop::object([("a", Prop::Undefined)]);
        let b = Prop::object([("b", Prop::Undefined)]);
        assert!(!shallow_equal(&a, &b));
    }

    #[test]
    fn nested_values_compare_by_identity() {
        let inner = Prop::array([1]);
        let a = Prop::object([("list", inner.clone())]);
        let b = Prop::object([("list", inner)]);
        assert!(shallow_equal(&a, &b));

        let c = Prop::object([("list", Prop::array([1]))]);
        assert!(!shallow_equal(&a, &c));
    }

    #[test]
    fn scalars_and_objects_never_equal() {
        assert!(!shallow_equal(&Prop::Null, &Prop::object([("a", 1)])));
        assert!(!shallow_equal(&Prop::from(1), &Prop::from("1")));
        assert!(!shallow_equal(&Prop::from(0), &Prop::array([0])));
    }

    #[test]
    fn arrays_compare_as_index_keyed_objects() {
        let empty = Prop::array(Vec::<Prop>::new());
        assert!(shallow_equal(&Prop::Object(Rc::default()), &empty));
        assert!(shallow_equal(&empty, &Prop::Object(Rc::default())));

        let list = Prop::array([1, 2]);
        let indexed = Prop::object([("0", 1), ("1", 2)]);
        assert!(shallow_equal(&list, &indexed));
        assert!(shallow_equal(&indexed, &list));

        assert!(!shallow_equal(&Prop::array([1]), &Prop::object([("1", 1)])));
        assert!(!shallow_equal(&Prop::array([1]), &Prop::object([("0", 2)])));
        assert!(!shallow_equal(&list, &Prop::object([("0", 1)])));
    }

    #[test]
    fn different_arrays_elementwise() {
        let same = shallow_different(&Prop::array(["a", "b"]), &Prop::array(["a", "b"]));
        assert!(!same);
        assert!(shallow_different(
            &Prop::array(["a", "b"]),
            &Prop::array(["b", "a"])
        ));
        assert!(shallow_different(&Prop::array(["a", "b"]), &Prop::array(["a"])));
    }

    #[test]
    fn different_arrays_one_level_per_element() {
        let prev = Prop::array([Prop::object([("id", 1)]), Prop::from(2)]);
        let next = Prop::array([Prop::object([("id", 1)]), Prop::from(2)]);
        assert!(!shallow_different(&prev, &next));

        let deeper = Prop::array([Prop::object([("ids", Prop::array([1]))])]);
        let deeper_copy = Prop::array([Prop::object([("ids", Prop::array([1]))])]);
        assert!(shallow_different(&deeper, &deeper_copy));
    }

    #[test]
    fn different_non_arrays() {
        assert!(!shallow_different(&Prop::from("div"), &Prop::from("div")));
        assert!(shallow_different(&Prop::from("div"), &Prop::from("span")));
        assert!(shallow_different(&Prop::Undefined, &Prop::array([1])));
    }
}
