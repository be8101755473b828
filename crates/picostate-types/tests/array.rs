//! Array transitions and indexed members.

use std::cmp::Ordering;

use picostate::{create, format_path, Arg, Meta, Picostate, PicostateError};
use picostate_types::{array_of, coerce, length, number, string};
use proptest::prelude::*;
use serde_json::{json, Value};

fn numbers(value: Value) -> Picostate {
    create(&array_of(number()), value).unwrap()
}

fn greater_than(n: f64) -> Arg {
    Arg::func(move |node| json!(coerce::number(node.value()) > n))
}

#[test]
fn test_push_and_pop() {
    let root = numbers(json!([1, 2, 3]));
    assert_eq!(root.invoke("push", &[4_i64.into()]).unwrap().value(), &json!([1, 2, 3, 4]));
    assert_eq!(root.invoke("pop", &[]).unwrap().value(), &json!([1, 2]));
    assert_eq!(numbers(json!([])).invoke("pop", &[]).unwrap().value(), &json!([]));
    assert_eq!(root.value(), &json!([1, 2, 3]));
}

#[test]
fn test_shift_and_unshift() {
    let root = numbers(json!([1, 2, 3]));
    assert_eq!(root.invoke("shift", &[]).unwrap().value(), &json!([2, 3]));
    assert_eq!(
        root.invoke("unshift", &[0_i64.into()]).unwrap().value(),
        &json!([0, 1, 2, 3])
    );
}

#[test]
fn test_filter() {
    let root = numbers(json!([1, 2, 3]));
    let next = root.invoke("filter", &[greater_than(1.0)]).unwrap();
    assert_eq!(next.value(), &json!([2, 3]));
}

#[test]
fn test_filter_keeping_everything_is_noop() {
    let root = numbers(json!([1, 2, 3]));
    let same = root.invoke("filter", &[greater_than(0.0)]).unwrap();
    assert!(Picostate::ptr_eq(&same, &root));
}

#[test]
fn test_filter_requires_callback() {
    let root = numbers(json!([1, 2, 3]));
    assert!(matches!(
        root.invoke("filter", &[1_i64.into()]),
        Err(PicostateError::InvalidArgument { .. })
    ));
}

fn descending() -> Arg {
    Arg::compare(|a, b| coerce::number(b.value()).total_cmp(&coerce::number(a.value())))
}

#[test]
fn test_sort_default_order() {
    let root = numbers(json!([3, 10, 1, 2]));
    let sorted = root.invoke("sort", &[]).unwrap();
    assert_eq!(sorted.value(), &json!([1, 2, 3, 10]));
    assert_eq!(root.value(), &json!([3, 10, 1, 2]));

    let words = create(&array_of(string()), json!(["b", "c", "a"])).unwrap();
    assert_eq!(words.invoke("sort", &[]).unwrap().value(), &json!(["a", "b", "c"]));
}

#[test]
fn test_sort_with_comparator() {
    let root = numbers(json!([1, 3, 2]));
    let sorted = root.invoke("sort", &[descending()]).unwrap();
    assert_eq!(sorted.value(), &json!([3, 2, 1]));
    assert_eq!(format_path(sorted.child(0_usize).unwrap().path()), "/0");
}

#[test]
fn test_sort_is_stable() {
    let root = numbers(json!([2, 1, 2, 1]));
    let ties = Arg::compare(|_, _| Ordering::Equal);
    let same = root.invoke("sort", &[ties]).unwrap();
    assert!(Picostate::ptr_eq(&same, &root));
}

#[test]
fn test_sort_already_sorted_is_noop() {
    let root = numbers(json!([1, 2, 3]));
    let same = root.invoke("sort", &[]).unwrap();
    assert!(Picostate::ptr_eq(&same, &root));
    let same = numbers(json!([3, 2, 1]));
    assert!(Picostate::ptr_eq(&same.invoke("sort", &[descending()]).unwrap(), &same));
    let empty = numbers(json!([]));
    assert!(Picostate::ptr_eq(&empty.invoke("sort", &[]).unwrap(), &empty));
}

#[test]
fn test_sort_requires_comparator() {
    let root = numbers(json!([2, 1]));
    assert!(matches!(
        root.invoke("sort", &[greater_than(0.0)]),
        Err(PicostateError::InvalidArgument { .. })
    ));
}

#[test]
fn test_length() {
    let root = numbers(json!([1, 2, 3]));
    assert_eq!(length(&root), 3);
    assert_eq!(length(&root.invoke("push", &[4_i64.into()]).unwrap()), 4);
    assert_eq!(length(&numbers(json!([]))), 0);
    let text = create(&string(), json!("abc")).unwrap();
    assert_eq!(length(&text), 0);
}

#[test]
fn test_map() {
    let root = numbers(json!([1, 2, 3]));
    let doubled = root
        .invoke("map", &[Arg::func(|node| json!(coerce::number(node.value()) * 2.0))])
        .unwrap();
    assert_eq!(doubled.value(), &json!([2.0, 4.0, 6.0]));

    let same = root
        .invoke("map", &[Arg::func(|node| node.value().clone())])
        .unwrap();
    assert!(Picostate::ptr_eq(&same, &root));
}

#[test]
fn test_slice() {
    let root = numbers(json!([1, 2, 3]));
    assert_eq!(root.invoke("slice", &[1_i64.into()]).unwrap().value(), &json!([2, 3]));
    assert_eq!(root.invoke("slice", &[(-2_i64).into()]).unwrap().value(), &json!([2, 3]));
    assert_eq!(
        root.invoke("slice", &[0_i64.into(), 2_i64.into()]).unwrap().value(),
        &json!([1, 2])
    );
    let whole = root.invoke("slice", &[0_i64.into()]).unwrap();
    assert!(Picostate::ptr_eq(&whole, &root));
}

#[test]
fn test_remove_and_clear() {
    let root = numbers(json!([1, 2, 3]));
    assert_eq!(root.invoke("remove", &[2_i64.into()]).unwrap().value(), &json!([1, 3]));
    let same = root.invoke("remove", &[9_i64.into()]).unwrap();
    assert!(Picostate::ptr_eq(&same, &root));
    assert_eq!(root.invoke("clear", &[]).unwrap().value(), &json!([]));
}

#[test]
fn test_members_are_addressable() {
    let root = numbers(json!([1, 2, 3]));
    let members = root.children();
    assert_eq!(members.len(), 3);
    let second = &members[1].1;
    assert_eq!(second.value(), &json!(2));
    assert_eq!(format_path(second.path()), "/1");
    assert!(Picostate::ptr_eq(&Meta::get(second).context, &root));
    assert_eq!(second.type_name(), "Picostate<Number>");
    assert!(root.child(3_usize).is_none());
}

#[test]
fn test_member_transition_writes_through() {
    let root = numbers(json!([1, 2, 3]));
    let next = root.child(1_usize).unwrap().invoke("increment", &[]).unwrap();
    assert_eq!(next.value(), &json!([1, 3, 3]));
    assert_eq!(next.child(1_usize).unwrap().value(), &json!(3));
    assert_eq!(next.children().len(), 3);

    // Array transitions keep working on the updated root.
    let pushed = next.invoke("push", &[4_i64.into()]).unwrap();
    assert_eq!(pushed.value(), &json!([1, 3, 3, 4]));
    assert_eq!(root.value(), &json!([1, 2, 3]));
}

#[test]
fn test_nested_arrays() {
    let root = create(&array_of(array_of(string())), json!([["a"], ["b", "c"]])).unwrap();
    let inner = root.child(1_usize).unwrap();
    assert_eq!(inner.type_name(), "Picostate<Array<String>>");
    let next = inner
        .child(0_usize)
        .unwrap()
        .invoke("concat", &["!".into()])
        .unwrap();
    assert_eq!(next.value(), &json!([["a"], ["b!", "c"]]));

    let next = root.child(0_usize).unwrap().invoke("push", &["z".into()]).unwrap();
    assert_eq!(next.value(), &json!([["a", "z"], ["b", "c"]]));
}

proptest! {
    #[test]
    fn prop_push_then_pop_restores_value(list in prop::collection::vec(-100_i64..100, 0..8), item in -100_i64..100) {
        let root = numbers(json!(list));
        let pushed = root.invoke("push", &[item.into()]).unwrap();
        prop_assert_eq!(pushed.children().len(), list.len() + 1);
        let popped = pushed.invoke("pop", &[]).unwrap();
        prop_assert_eq!(popped.value(), root.value());
    }

    #[test]
    fn prop_filter_partitions(list in prop::collection::vec(-100_i64..100, 0..8), pivot in -100_i64..100) {
        let root = numbers(json!(list));
        let pivot = pivot as f64;
        let above = root.invoke("filter", &[greater_than(pivot)]).unwrap();
        let expected: Vec<i64> = list.iter().copied().filter(|n| *n as f64 > pivot).collect();
        prop_assert_eq!(above.value(), &json!(expected));
        if expected.len() == list.len() {
            prop_assert!(Picostate::ptr_eq(&above, &root));
        }
    }

    #[test]
    fn prop_sort_orders_members(list in prop::collection::vec(-100_i64..100, 0..8)) {
        let root = numbers(json!(list));
        let sorted = root.invoke("sort", &[]).unwrap();
        let mut expected = list.clone();
        expected.sort();
        prop_assert_eq!(sorted.value(), &json!(expected));
        prop_assert_eq!(length(&sorted), list.len());
        if expected == list {
            prop_assert!(Picostate::ptr_eq(&sorted, &root));
        }
    }

    #[test]
    fn prop_member_update_touches_one_slot(list in prop::collection::vec(-100_i64..100, 1..8), pick in any::<prop::sample::Index>()) {
        let root = numbers(json!(list));
        let index = pick.index(list.len());
        let next = root.child(index).unwrap().invoke("increment", &[]).unwrap();
        let mut expected = list.clone();
        expected[index] += 1;
        prop_assert_eq!(next.value(), &json!(expected));
    }
}
