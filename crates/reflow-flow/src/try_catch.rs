use std::rc::Rc;

use reflow_core::{MutableState, RenderError, View, catch_render, group, remember_state, with_key};

use crate::Render;

/// Error boundary.
///
/// Renders `try` until it panics. From then on this slot renders `catch`
/// with the recorded [`RenderError`], and `on_error` has been called once.
pub struct TryCatch {
    try_: Render<()>,
    catch: Render<RenderError>,
    on_error: Option<Rc<dyn Fn(&RenderError)>>,
}

impl TryCatch {
    pub fn new(try_: impl Into<Render<()>>) -> Self {
        Self {
            try_: try_.into(),
            catch: Render::empty(),
            on_error: None,
        }
    }

    pub fn catch(mut self, catch: impl Into<Render<RenderError>>) -> Self {
        self.catch = catch.into();
        self
    }

    pub fn catch_with(self, f: impl Fn(&RenderError) -> View + 'static) -> Self {
        self.catch(Render::with(f))
    }

    pub fn on_error(mut self, f: impl Fn(&RenderError) + 'static) -> Self {
        self.on_error = Some(Rc::new(f));
        self
    }

    pub fn view(self) -> View {
        group(move || {
            let caught: MutableState<Option<RenderError>> = remember_state(|| None);
            if let Some(err) = caught.get() {
                return with_key("catch", || self.catch.eval(Some(&err)));
            }

            match with_key("try", || catch_render(|| self.try_.render())) {
                Ok(view) => view,
                Err(err) => {
                    log::debug!("try_catch: switching to catch after {err}");
                    if let Some(on_error) = &self.on_error {
                        on_error(&err);
                    }
                    caught.set_silent(Some(err.clone()));
                    with_key("catch", || self.catch.eval(Some(&err)))
                }
            }
        })
    }
}
