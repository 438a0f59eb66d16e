//! Single-assignment asynchronous results.
//!
//! A `Promise<T, E>` is a shared handle to a value that will eventually be
//! either `Ok(T)` or `Err(E)`. Identity matters: two handles are the same
//! promise only if they were cloned from one another (`ptr_eq`), which is how
//! components notice that a new operation replaced the old one.
//!
//! Settlement callbacks never run inline. They are queued on the runtime's
//! task queue and run on the next `Runtime::run_until_stalled`.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use crate::task::{TaskError, spawn_local};

type Callback<T, E> = Box<dyn FnOnce(Result<T, E>)>;

enum PromiseState<T, E> {
    Pending(Vec<Callback<T, E>>),
    Settled(Result<T, E>),
}

pub struct Promise<T, E> {
    inner: Rc<RefCell<PromiseState<T, E>>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.inner.borrow() {
            PromiseState::Pending(_) => "pending",
            PromiseState::Settled(Ok(_)) => "resolved",
            PromiseState::Settled(Err(_)) => "rejected",
        };
        f.debug_struct("Promise")
            .field("id", &Rc::as_ptr(&self.inner))
            .field("state", &state)
            .finish()
    }
}

/// Write half of a pending promise. Settling consumes it.
pub struct Resolver<T, E> {
    promise: Promise<T, E>,
}

impl<T: Clone + 'static, E: Clone + 'static> Resolver<T, E> {
    pub fn resolve(self, value: T) {
        self.promise.settle(Ok(value));
    }

    pub fn reject(self, error: E) {
        self.promise.settle(Err(error));
    }

    pub fn settle(self, result: Result<T, E>) {
        self.promise.settle(result);
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Promise<T, E> {
    /// A pending promise and the handle that settles it.
    pub fn pending() -> (Self, Resolver<T, E>) {
        let promise = Self {
            inner: Rc::new(RefCell::new(PromiseState::Pending(Vec::new()))),
        };
        let resolver = Resolver {
            promise: promise.clone(),
        };
        (promise, resolver)
    }

    pub fn resolved(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PromiseState::Settled(Ok(value)))),
        }
    }

    pub fn rejected(error: E) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PromiseState::Settled(Err(error)))),
        }
    }

    /// Starts `fut` on the runtime's task queue and returns a promise of its output.
    pub fn spawn(fut: impl Future<Output = Result<T, E>> + 'static) -> Result<Self, TaskError> {
        let (promise, resolver) = Self::pending();
        spawn_local(async move {
            resolver.settle(fut.await);
        })?;
        Ok(promise)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_settled(&self) -> bool {
        matches!(&*self.inner.borrow(), PromiseState::Settled(_))
    }

    /// The settled result, if any.
    pub fn peek(&self) -> Option<Result<T, E>> {
        match &*self.inner.borrow() {
            PromiseState::Settled(r) => Some(r.clone()),
            PromiseState::Pending(_) => None,
        }
    }

    /// Registers `f` to receive the result. It runs on the task queue, even if
    /// the promise has already settled.
    pub fn on_settle(&self, f: impl FnOnce(Result<T, E>) + 'static) {
        let settled = {
            let mut state = self.inner.borrow_mut();
            match &mut *state {
                PromiseState::Pending(callbacks) => {
                    callbacks.push(Box::new(f));
                    return;
                }
                PromiseState::Settled(r) => r.clone(),
            }
        };
        dispatch(Box::new(f), settled);
    }

    fn settle(&self, result: Result<T, E>) {
        let callbacks = {
            let mut state = self.inner.borrow_mut();
            match std::mem::replace(&mut *state, PromiseState::Settled(result.clone())) {
                PromiseState::Pending(callbacks) => callbacks,
                PromiseState::Settled(previous) => {
                    log::warn!("promise settled twice; keeping the first result");
                    *state = PromiseState::Settled(previous);
                    return;
                }
            }
        };
        for cb in callbacks {
            dispatch(cb, result.clone());
        }
    }
}

fn dispatch<T: 'static, E: 'static>(cb: Callback<T, E>, result: Result<T, E>) {
    if let Err(err) = spawn_local(async move { cb(result) }) {
        log::error!("dropping promise settlement: {err}");
    }
}
