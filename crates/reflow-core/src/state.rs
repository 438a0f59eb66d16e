use std::cell::RefCell;
use std::rc::Rc;

use crate::{current_path, invalidate, remember, remember_with_key, request_frame};

/// Host-owned state whose writes schedule a new composition.
///
/// State created during composition belongs to the group being composed;
/// writes invalidate that group so cached ancestors compose it again.
pub struct MutableState<T> {
    inner: Rc<RefCell<T>>,
    owner: Option<Rc<str>>,
}

impl<T> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            owner: self.owner.clone(),
        }
    }
}

impl<T: 'static> MutableState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
            owner: current_path().map(Rc::from),
        }
    }

    fn changed(&self) {
        match &self.owner {
            Some(path) => invalidate(path),
            None => request_frame(),
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow())
    }

    pub fn set(&self, value: T) {
        *self.inner.borrow_mut() = value;
        self.changed();
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.borrow_mut());
        self.changed();
    }

    /// Writes without scheduling a frame. Meant for state changed while the
    /// frame that reads it is still being composed.
    pub fn set_silent(&self, value: T) {
        *self.inner.borrow_mut() = value;
    }

    pub fn update_silent<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> MutableState<T> {
    (*remember(|| MutableState::new(init()))).clone()
}

pub fn remember_state_with_key<T: 'static>(
    key: impl Into<String>,
    init: impl FnOnce() -> T,
) -> MutableState<T> {
    (*remember_with_key(key, || MutableState::new(init()))).clone()
}
