use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::runtime::{unwind_mark, unwind_to};

/// A panic raised while composing a subtree, recovered by an error boundary.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("render panicked in `{component}`: {message}")]
pub struct RenderError {
    pub message: String,
    /// Composition path that was active when the panic was raised.
    pub component: String,
}

/// Error-boundary primitive: composes `f`, turning a panic into a `RenderError`.
///
/// The composition stack is restored to where it was on entry and effects
/// queued by the failed subtree are discarded.
pub fn catch_render<R>(f: impl FnOnce() -> R) -> Result<R, RenderError> {
    let mark = unwind_mark();
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(v) => Ok(v),
        Err(err) => {
            let (component, log_it) = unwind_to(mark);
            let message = if let Some(s) = err.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = err.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            let component = if component.is_empty() {
                "<root>".to_string()
            } else {
                component
            };
            let error = RenderError { message, component };
            if log_it {
                log::error!("{error}");
            }
            Err(error)
        }
    }
}
