//! A component whose constructor, lifecycle hooks and update guard are all
//! supplied as props.
//!
//! ```rust
//! use reflow_core::{Runtime, Text};
//! use reflow_flow::Bare;
//!
//! let mut rt = Runtime::new();
//! let frame = rt.compose(|| {
//!     Bare::<u32>::render_with(|inst| Text(format!("count {}", inst.state())))
//!         .constructor(|c| c.set_state(5))
//!         .view()
//!         .unwrap_or_default()
//! });
//! assert_eq!(frame.root.texts(), vec!["count 5"]);
//! ```
//!
//! Every composition after the first is an update. The update guard decides
//! whether it re-renders:
//!
//! - with `pure_by`, only when the new value is shallow-different from the
//!   last accepted one,
//! - with `should_update`, when the predicate approves the next state,
//! - otherwise always.
//!
//! A rejected update reuses the previous view and keeps its subtree alive,
//! unless state inside the subtree changed: then the body is composed again
//! without counting as an update. State written with `set_state` is
//! committed either way.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use reflow_core::{
    RenderError, View, after_commit, catch_render, current_path, current_scope,
    descendants_invalidated, group, invalidate, remember, request_frame, retain_group, with_key,
};

use crate::{FlowError, Prop, Render, shallow_different};

type Hook<S> = Rc<dyn Fn(&BareInstance<S>)>;
type StateHook<S> = Rc<dyn Fn(&BareInstance<S>, &S)>;
type Predicate<S> = Rc<dyn Fn(&BareInstance<S>, &S) -> bool>;
type CatchHook<S> = Rc<dyn Fn(&BareInstance<S>, &RenderError)>;
type ConstructorFn<S> = Box<dyn FnOnce(&mut Constructor<S>)>;

struct Hooks<S> {
    did_mount: Option<Hook<S>>,
    did_update: Option<StateHook<S>>,
    will_unmount: Option<Hook<S>>,
    did_catch: Option<CatchHook<S>>,
}

impl<S> Default for Hooks<S> {
    fn default() -> Self {
        Self {
            did_mount: None,
            did_update: None,
            will_unmount: None,
            did_catch: None,
        }
    }
}

/// How an update is approved.
pub enum UpdateGuard<S> {
    Always,
    Custom(Predicate<S>),
    /// Compared against the last accepted value with [`shallow_different`].
    PureBy(Prop),
}

impl<S> UpdateGuard<S> {
    fn new(pure_by: Option<Prop>, should_update: Option<Predicate<S>>) -> Result<Self, FlowError> {
        match (pure_by, should_update) {
            (Some(_), Some(_)) => Err(FlowError::ConflictingUpdateGuards),
            (Some(key), None) => Ok(UpdateGuard::PureBy(key)),
            (None, Some(f)) => Ok(UpdateGuard::Custom(f)),
            (None, None) => Ok(UpdateGuard::Always),
        }
    }
}

/// Construction-phase access to the state. Writes land directly in the
/// initial state and schedule nothing.
pub struct Constructor<S> {
    state: S,
}

impl<S> Constructor<S> {
    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn set_state(&mut self, state: S) {
        self.state = state;
    }

    pub fn update_state(&mut self, f: impl FnOnce(&mut S)) {
        f(&mut self.state);
    }
}

struct BareCell<S> {
    state: RefCell<S>,
    pending: RefCell<Option<S>>,
    force: Cell<bool>,
    mounted: Cell<bool>,
    unmounted: Cell<bool>,
    renders: Cell<u32>,
    accepted: RefCell<Option<Prop>>,
    last_view: RefCell<View>,
    hooks: RefCell<Hooks<S>>,
    owner: Option<String>,
}

/// The live instance handed to the render function and to every hook.
pub struct BareInstance<S> {
    cell: Rc<BareCell<S>>,
}

impl<S> Clone for BareInstance<S> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<S: Clone + 'static> BareInstance<S> {
    fn construct(state: S) -> Self {
        Self {
            cell: Rc::new(BareCell {
                state: RefCell::new(state),
                pending: RefCell::new(None),
                force: Cell::new(false),
                mounted: Cell::new(false),
                unmounted: Cell::new(false),
                renders: Cell::new(0),
                accepted: RefCell::new(None),
                last_view: RefCell::new(View::empty()),
                hooks: RefCell::new(Hooks::default()),
                owner: current_path(),
            }),
        }
    }

    /// The committed state.
    pub fn state(&self) -> S {
        self.cell.state.borrow().clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.cell.state.borrow())
    }

    fn schedule(&self) {
        match &self.cell.owner {
            Some(path) => invalidate(path),
            None => request_frame(),
        }
    }

    /// Queues `state` for the next composition.
    pub fn set_state(&self, state: S) {
        *self.cell.pending.borrow_mut() = Some(state);
        self.schedule();
    }

    /// Like `set_state`, starting from the queued state if there is one.
    pub fn update_state(&self, f: impl FnOnce(&mut S)) {
        let mut next = self
            .cell
            .pending
            .borrow_mut()
            .take()
            .unwrap_or_else(|| self.state());
        f(&mut next);
        self.set_state(next);
    }

    /// Re-renders on the next composition whatever the guard says.
    pub fn force_update(&self) {
        self.cell.force.set(true);
        self.schedule();
    }

    /// The last `pure_by` value an update was accepted for.
    pub fn pure_by(&self) -> Option<Prop> {
        self.cell.accepted.borrow().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.cell.mounted.get()
    }

    pub fn render_count(&self) -> u32 {
        self.cell.renders.get()
    }

    fn mount(&self) {
        if let Some(scope) = current_scope() {
            let inst = self.clone();
            scope.add_disposer(move || inst.unmount());
        }
        let inst = self.clone();
        after_commit(move || {
            inst.cell.mounted.set(true);
            log::debug!("bare: mounted");
            let hook = inst.cell.hooks.borrow().did_mount.clone();
            if let Some(f) = hook {
                f(&inst);
            }
        });
    }

    fn unmount(&self) {
        if self.cell.unmounted.replace(true) {
            return;
        }
        self.cell.mounted.set(false);
        log::debug!("bare: unmounting");
        let hook = self.cell.hooks.borrow().will_unmount.clone();
        if let Some(f) = hook {
            f(self);
        }
    }

    fn approve(&self, guard: &UpdateGuard<S>, next: &S) -> bool {
        if self.cell.force.replace(false) {
            return true;
        }
        match guard {
            UpdateGuard::Always => true,
            UpdateGuard::Custom(should_update) => should_update(self, next),
            UpdateGuard::PureBy(key) => {
                let mut accepted = self.cell.accepted.borrow_mut();
                let changed = accepted
                    .as_ref()
                    .is_none_or(|prev| shallow_different(prev, key));
                if changed {
                    *accepted = Some(key.clone());
                }
                changed
            }
        }
    }

    fn update(&self, guard: &UpdateGuard<S>, render: &Render<BareInstance<S>>) -> View {
        let pending = self.cell.pending.borrow_mut().take();
        let next = pending.clone().unwrap_or_else(|| self.state());
        let approved = self.approve(guard, &next);

        let prev = self.state();
        if let Some(state) = pending {
            *self.cell.state.borrow_mut() = state;
        }

        if !approved {
            if descendants_invalidated() {
                log::trace!("bare: update rejected, recomposing invalidated descendants");
                return self.render_body(render);
            }
            log::trace!("bare: update rejected, reusing the last view");
            retain_group();
            return self.cell.last_view.borrow().clone();
        }

        let view = self.render_body(render);
        let inst = self.clone();
        after_commit(move || {
            let hook = inst.cell.hooks.borrow().did_update.clone();
            if let Some(f) = hook {
                f(&inst, &prev);
            }
        });
        view
    }

    fn render_body(&self, render: &Render<BareInstance<S>>) -> View {
        self.cell.renders.set(self.cell.renders.get() + 1);
        let did_catch = self.cell.hooks.borrow().did_catch.clone();
        let view = match did_catch {
            Some(did_catch) => with_key("body", || catch_render(|| render.eval(Some(self))))
                .unwrap_or_else(|err| {
                    did_catch(self, &err);
                    View::empty()
                }),
            None => with_key("body", || render.eval(Some(self))),
        };
        *self.cell.last_view.borrow_mut() = view.clone();
        view
    }
}

/// Builder for a [`BareInstance`]-backed component. State starts at
/// `S::default()` unless the constructor sets it.
pub struct Bare<S> {
    render: Render<BareInstance<S>>,
    constructor: Option<ConstructorFn<S>>,
    pure_by: Option<Prop>,
    should_update: Option<Predicate<S>>,
    hooks: Hooks<S>,
}

impl<S: Clone + Default + 'static> Bare<S> {
    pub fn new(render: impl Into<Render<BareInstance<S>>>) -> Self {
        Self {
            render: render.into(),
            constructor: None,
            pure_by: None,
            should_update: None,
            hooks: Hooks::default(),
        }
    }

    pub fn render_with(f: impl Fn(&BareInstance<S>) -> View + 'static) -> Self {
        Self::new(Render::with(f))
    }

    /// Runs once, before the first render.
    pub fn constructor(mut self, f: impl FnOnce(&mut Constructor<S>) + 'static) -> Self {
        self.constructor = Some(Box::new(f));
        self
    }

    pub fn pure_by(mut self, key: impl Into<Prop>) -> Self {
        self.pure_by = Some(key.into());
        self
    }

    pub fn should_update(mut self, f: impl Fn(&BareInstance<S>, &S) -> bool + 'static) -> Self {
        self.should_update = Some(Rc::new(f));
        self
    }

    pub fn did_mount(mut self, f: impl Fn(&BareInstance<S>) + 'static) -> Self {
        self.hooks.did_mount = Some(Rc::new(f));
        self
    }

    /// Called after an approved update commits, with the state from before it.
    pub fn did_update(mut self, f: impl Fn(&BareInstance<S>, &S) + 'static) -> Self {
        self.hooks.did_update = Some(Rc::new(f));
        self
    }

    pub fn will_unmount(mut self, f: impl Fn(&BareInstance<S>) + 'static) -> Self {
        self.hooks.will_unmount = Some(Rc::new(f));
        self
    }

    /// Catches panics raised while rendering the body. The body renders as
    /// the empty view for that composition.
    pub fn did_catch(mut self, f: impl Fn(&BareInstance<S>, &RenderError) + 'static) -> Self {
        self.hooks.did_catch = Some(Rc::new(f));
        self
    }

    pub fn view(self) -> Result<View, FlowError> {
        let guard = UpdateGuard::new(self.pure_by, self.should_update)?;
        let Bare {
            render,
            constructor,
            hooks,
            ..
        } = self;

        Ok(group(move || {
            let mut fresh = false;
            let instance = (*remember(|| {
                fresh = true;
                let mut ctor = Constructor {
                    state: S::default(),
                };
                if let Some(f) = constructor {
                    f(&mut ctor);
                }
                BareInstance::construct(ctor.state)
            }))
            .clone();
            *instance.cell.hooks.borrow_mut() = hooks;

            if !fresh {
                return instance.update(&guard, &render);
            }

            if let UpdateGuard::PureBy(key) = &guard {
                *instance.cell.accepted.borrow_mut() = Some(key.clone());
            }
            let view = instance.render_body(&render);
            instance.mount();
            view
        }))
    }
}
