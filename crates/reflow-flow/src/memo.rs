use std::cell::RefCell;

use reflow_core::{View, descendants_invalidated, group, remember, retain_group, with_key};
use smallvec::SmallVec;

use crate::{Prop, Render};

pub type Deps = SmallVec<[Prop; 4]>;

/// Whether two dependency lists differ: a length change, or any element that
/// is not the same value as its counterpart.
pub fn deps_changed(prev: &[Prop], next: &[Prop]) -> bool {
    prev.len() != next.len() || prev.iter().zip(next).any(|(a, b)| !a.same_value(b))
}

/// Caches the view produced by `render` until `deps` change.
///
/// An empty dependency list computes the view once for as long as this memo
/// keeps being composed. While the cached view is reused, state remembered
/// inside it is kept alive. State written inside the cached subtree makes
/// the next composition rebuild it even though the deps are unchanged.
pub fn Memo(deps: &[Prop], render: impl Into<Render<()>>) -> View {
    let render = render.into();
    group(|| {
        let cache = remember(|| RefCell::new(None::<(Deps, View)>));
        let hit = cache
            .borrow()
            .as_ref()
            .filter(|(prev, _)| !deps_changed(prev, deps))
            .map(|(_, view)| view.clone());
        if let Some(view) = hit {
            if !descendants_invalidated() {
                retain_group();
                return view;
            }
            log::trace!("memo: cached subtree has invalidated state, recomposing");
        }

        let view = with_key("body", || render.render());
        *cache.borrow_mut() = Some((deps.iter().cloned().collect(), view.clone()));
        view
    })
}
