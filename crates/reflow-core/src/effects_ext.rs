use crate::{Dispose, after_commit, current_scope, remember};
use std::cell::RefCell;
use std::rc::Rc;

/// Runs `effect` after the frame commits whenever `key` changes.
///
/// The `Dispose` it returns runs before the next run, or when the enclosing
/// group is torn down.
pub fn disposable_effect<K: PartialEq + Clone + 'static>(
    key: K,
    effect: impl FnOnce() -> Dispose + 'static,
) {
    let last_key = remember(|| RefCell::new(None::<K>));
    let cleanup_slot: Rc<RefCell<Option<Dispose>>> = remember(|| RefCell::new(None));
    let installed = remember(|| RefCell::new(false));

    // Install a single unmount disposer for this callsite.
    if !*installed.borrow() {
        *installed.borrow_mut() = true;
        if let Some(scope) = current_scope() {
            let cleanup_slot = cleanup_slot.clone();
            scope.add_disposer(move || {
                let d = cleanup_slot.borrow_mut().take();
                if let Some(d) = d {
                    d.run();
                }
            });
        }
    }

    let changed = last_key.borrow().as_ref() != Some(&key);
    if changed {
        *last_key.borrow_mut() = Some(key);
        after_commit(move || {
            let previous = cleanup_slot.borrow_mut().take();
            if let Some(d) = previous {
                d.run();
            }
            let d = effect();
            *cleanup_slot.borrow_mut() = Some(d);
        });
    }
}

