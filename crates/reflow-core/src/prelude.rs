pub use crate::effects::{Dispose, effect, on_unmount};
pub use crate::effects_ext::disposable_effect;
pub use crate::elements::{Element, Fragment, Text};
pub use crate::error::{RenderError, catch_render};
pub use crate::locals::{local, provide};
pub use crate::promise::{Promise, Resolver};
pub use crate::runtime::{
    Frame, Runtime, RuntimeConfig, after_commit, descendants_invalidated, group, invalidate,
    remember, remember_with_key, request_frame, retain_group, with_key,
};
pub use crate::scope::{Scope, current_scope, scoped_effect};
pub use crate::state::{MutableState, remember_state, remember_state_with_key};
pub use crate::task::{TaskError, spawn_local};
pub use crate::view::{View, ViewKind};
