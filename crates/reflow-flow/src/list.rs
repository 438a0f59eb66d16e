use std::fmt::Display;

use reflow_core::{Fragment, View, group, with_key};

/// Renders `with(item, index, target)` for every item of `target`, in order,
/// as one group. Each item's state is keyed by its index.
pub fn Map<T>(target: &[T], with: impl Fn(&T, usize, &[T]) -> View) -> View {
    group(|| {
        Fragment(
            target
                .iter()
                .enumerate()
                .map(|(i, item)| with_key(i.to_string(), || with(item, i, target))),
        )
    })
}

/// Like [`Map`], but each item's state follows the key returned by `key`, so
/// reordering the input moves state along with the items.
pub fn MapKeyed<T, K: Display>(
    target: &[T],
    key: impl Fn(&T) -> K,
    with: impl Fn(&T, usize, &[T]) -> View,
) -> View {
    group(|| {
        Fragment(target.iter().enumerate().map(|(i, item)| {
            let k = key(item).to_string();
            with_key(&k, || with(item, i, target)).key(k)
        }))
    })
}
