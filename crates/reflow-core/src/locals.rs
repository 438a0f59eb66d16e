//! # Composition locals
//!
//! Thread-local values that a subtree can override while it is composed.
//! Components read them with [`local`] and callers scope overrides with
//! [`provide`]:
//!
//! ```rust
//! use reflow_core::*;
//!
//! #[derive(Clone, Default, PartialEq, Debug)]
//! struct Verbose(bool);
//!
//! assert_eq!(local::<Verbose>(), Verbose(false));
//! provide(Verbose(true), || {
//!     assert_eq!(local::<Verbose>(), Verbose(true));
//! });
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static LOCALS_STACK: RefCell<Vec<HashMap<TypeId, Box<dyn Any>>>> = RefCell::new(Vec::new());
}

fn with_locals_frame<R>(f: impl FnOnce() -> R) -> R {
    // Non-panicking frame guard (ensures pop on unwind)
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            LOCALS_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    LOCALS_STACK.with(|st| st.borrow_mut().push(HashMap::new()));
    let _guard = Guard;
    f()
}

fn set_local_boxed(t: TypeId, v: Box<dyn Any>) {
    LOCALS_STACK.with(|st| {
        if let Some(top) = st.borrow_mut().last_mut() {
            top.insert(t, v);
        }
    });
}

/// Composes `f` with `value` visible to [`local`] for its type.
pub fn provide<T: Clone + 'static, R>(value: T, f: impl FnOnce() -> R) -> R {
    with_locals_frame(|| {
        set_local_boxed(TypeId::of::<T>(), Box::new(value));
        f()
    })
}

/// Innermost provided value of type `T`, or `T::default()`.
pub fn local<T: Clone + Default + 'static>() -> T {
    LOCALS_STACK.with(|st| {
        for frame in st.borrow().iter().rev() {
            if let Some(v) = frame.get(&TypeId::of::<T>())
                && let Some(d) = v.downcast_ref::<T>()
            {
                return d.clone();
            }
        }
        T::default()
    })
}
