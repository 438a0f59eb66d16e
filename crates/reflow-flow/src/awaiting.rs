use reflow_core::{
    Dispose, Fragment, MutableState, Promise, View, disposable_effect, group, local, on_unmount,
    provide, remember_state, with_key,
};
use std::cell::Cell;
use std::rc::Rc;

use crate::Render;

/// Subtree-wide defaults for [`Await`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AwaitDefaults {
    /// Keep showing the last resolved value while a replacement promise is pending.
    pub show_stale_data: bool,
}

pub fn with_await_defaults<R>(defaults: AwaitDefaults, f: impl FnOnce() -> R) -> R {
    provide(defaults, f)
}

pub fn await_defaults() -> AwaitDefaults {
    local()
}

/// Where an awaited operation stands.
#[derive(Clone, Debug, PartialEq)]
pub enum AsyncState<T, E> {
    /// Waiting for settlement. `stale` carries the previous resolved value
    /// when stale data is being kept.
    Pending { stale: Option<T> },
    Resolved(T),
    /// No promise was supplied.
    Empty,
    Rejected(E),
}

impl<T, E> AsyncState<T, E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, AsyncState::Pending { .. })
    }

    /// The value `then` would be rendered with: the resolved value, or the
    /// stale one while pending.
    pub fn value(&self) -> Option<&T> {
        match self {
            AsyncState::Resolved(v) => Some(v),
            AsyncState::Pending { stale } => stale.as_ref(),
            AsyncState::Empty | AsyncState::Rejected(_) => None,
        }
    }

    fn into_value(self) -> Option<T> {
        match self {
            AsyncState::Resolved(v) => Some(v),
            AsyncState::Pending { stale } => stale,
            AsyncState::Empty | AsyncState::Rejected(_) => None,
        }
    }
}

/// Per-instance bookkeeping: the tracked promise and its generation.
struct Tracker<T, E> {
    state: AsyncState<T, E>,
    generation: u64,
    promise: Option<Promise<T, E>>,
    attached: bool,
}

impl<T: Clone + 'static, E: Clone + 'static> Tracker<T, E> {
    fn new() -> Self {
        Self {
            state: AsyncState::Pending { stale: None },
            generation: 0,
            promise: None,
            attached: false,
        }
    }

    /// Switches to `promise` if it is not the one already tracked. Returns
    /// whether a new generation started.
    fn attach(&mut self, promise: Option<&Promise<T, E>>, show_stale: bool) -> bool {
        let same = match (&self.promise, promise) {
            (None, None) => self.attached,
            (Some(current), Some(next)) => current.ptr_eq(next),
            _ => false,
        };
        if same {
            return false;
        }

        self.attached = true;
        self.generation += 1;
        self.promise = promise.cloned();
        let previous = std::mem::replace(&mut self.state, AsyncState::Empty);
        if promise.is_some() {
            let stale = if show_stale { previous.into_value() } else { None };
            self.state = AsyncState::Pending { stale };
        }
        true
    }

    fn settle(&mut self, result: Result<T, E>) {
        self.state = match result {
            Ok(v) => AsyncState::Resolved(v),
            Err(e) => AsyncState::Rejected(e),
        };
    }
}

/// Renders a branch per state of a promise.
///
/// - pending: `placeholder`, or `then` with the previous value when
///   `show_stale_data` is on and one exists,
/// - resolved: `then` with the value,
/// - rejected: `catch` with the error (nothing if there is no `catch`),
/// - no promise: `then` without a value.
///
/// `finally` is rendered after whichever branch is active. A settlement from
/// a promise that has since been replaced, or that arrives after the
/// component was torn down, is ignored.
pub struct Await<T, E> {
    promise: Option<Promise<T, E>>,
    then: Render<T>,
    catch: Option<Render<E>>,
    finally: Option<Render<()>>,
    placeholder: Option<Render<()>>,
    show_stale_data: Option<bool>,
}

impl<T: Clone + 'static, E: Clone + 'static> Await<T, E> {
    pub fn new(promise: impl Into<Option<Promise<T, E>>>) -> Self {
        Self {
            promise: promise.into(),
            then: Render::empty(),
            catch: None,
            finally: None,
            placeholder: None,
            show_stale_data: None,
        }
    }

    pub fn then(mut self, then: impl Into<Render<T>>) -> Self {
        self.then = then.into();
        self
    }

    pub fn then_with(self, f: impl Fn(&T) -> View + 'static) -> Self {
        self.then(Render::with(f))
    }

    pub fn catch(mut self, catch: impl Into<Render<E>>) -> Self {
        self.catch = Some(catch.into());
        self
    }

    pub fn catch_with(self, f: impl Fn(&E) -> View + 'static) -> Self {
        self.catch(Render::with(f))
    }

    pub fn finally(mut self, finally: impl Into<Render<()>>) -> Self {
        self.finally = Some(finally.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<Render<()>>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Overrides [`AwaitDefaults::show_stale_data`] for this instance.
    pub fn show_stale_data(mut self, show: bool) -> Self {
        self.show_stale_data = Some(show);
        self
    }

    pub fn view(self) -> View {
        let show_stale = self
            .show_stale_data
            .unwrap_or_else(|| await_defaults().show_stale_data);

        group(move || {
            let tracker: MutableState<Tracker<T, E>> = remember_state(Tracker::new);
            let restarted =
                tracker.update_silent(|t| t.attach(self.promise.as_ref(), show_stale));
            let generation = tracker.with(|t| t.generation);
            if restarted {
                log::debug!("await: tracking generation {generation}");
            }

            subscribe(&tracker, self.promise.clone(), generation);

            let state = tracker.with(|t| t.state.clone());
            let body = match &state {
                AsyncState::Pending { stale: Some(v) } if show_stale => {
                    with_key("then", || self.then.eval(Some(v)))
                }
                AsyncState::Pending { .. } => with_key("placeholder", || {
                    self.placeholder
                        .as_ref()
                        .map_or_else(View::empty, Render::render)
                }),
                AsyncState::Resolved(v) => with_key("then", || self.then.eval(Some(v))),
                AsyncState::Empty => with_key("then", || self.then.eval(None)),
                AsyncState::Rejected(e) => with_key("catch", || {
                    self.catch
                        .as_ref()
                        .map_or_else(View::empty, |c| c.eval(Some(e)))
                }),
            };
            let finally = with_key("finally", || {
                self.finally
                    .as_ref()
                    .map_or_else(View::empty, Render::render)
            });
            Fragment([body, finally])
        })
    }
}

/// Listens for the settlement of `promise` once per generation. The
/// subscription is cancelled when the generation moves on or the component
/// is torn down, and late results are then dropped.
fn subscribe<T: Clone + 'static, E: Clone + 'static>(
    tracker: &MutableState<Tracker<T, E>>,
    promise: Option<Promise<T, E>>,
    generation: u64,
) {
    let tracker = tracker.clone();
    disposable_effect(generation, move || {
        let Some(promise) = promise else {
            return Dispose::noop();
        };
        let cancelled = Rc::new(Cell::new(false));
        let token = cancelled.clone();
        promise.on_settle(move |result| {
            let current = tracker.with(|t| t.generation == generation);
            if token.get() || !current {
                log::debug!("await: discarding settlement of superseded generation {generation}");
                return;
            }
            tracker.update(|t| t.settle(result));
        });
        on_unmount(move || cancelled.set(true))
    });
}
