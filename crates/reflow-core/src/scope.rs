use std::cell::RefCell;
use std::rc::Rc;

/// Cleanup bag owned by a composition group.
///
/// Every group entered during composition gets one. When a group stops being
/// composed, the runtime disposes its scope, running the registered disposers
/// in registration order.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                disposers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    pub fn pending_disposers(&self) -> usize {
        self.inner.disposers.borrow().len()
    }

    pub fn dispose(self) {
        // Taken first so a disposer may register on a fresh scope without a borrow clash.
        let disposers = std::mem::take(&mut *self.inner.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Scope of the innermost group being composed, if any.
pub fn current_scope() -> Option<Scope> {
    crate::runtime::current_group_scope()
}

/// Runs `f` now and registers the cleanup it returns on the current scope.
pub fn scoped_effect<F>(f: F)
where
    F: FnOnce() -> Box<dyn FnOnce()> + 'static,
{
    if let Some(scope) = current_scope() {
        let cleanup = f();
        scope.add_disposer(cleanup);
    } else {
        log::warn!("scoped_effect called outside composition; cleanup will never run");
        let _ = f();
    }
}
