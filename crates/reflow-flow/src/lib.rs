#![allow(non_snake_case)]
//! Declarative control flow for Reflow compositions.
//!
//! Each component is a plain function (or a builder ending in `.view()`)
//! that returns a `View` and keeps whatever must outlive a frame in the
//! runtime's slot table:
//!
//! - `If` / `IfElse` and `Switch` with `When` cases pick a branch,
//! - `Map` / `MapKeyed` render a sequence,
//! - `Await` follows a `Promise`,
//! - `Memo` caches a subtree by dependencies,
//! - `Bare` takes its constructor, lifecycle hooks and update guard as props,
//! - `TryCatch` recovers from panics in its subtree.
//!
//! ```rust
//! use reflow_core::{Runtime, Text};
//! use reflow_flow::*;
//!
//! let mut rt = Runtime::new();
//! let frame = rt.compose(|| {
//!     Switch([
//!         When(false, Text("first")),
//!         When(Test::when(|| true), Text("second")),
//!     ])
//! });
//! assert_eq!(frame.root.texts(), vec!["second"]);
//! ```

pub mod awaiting;
pub mod bare;
pub mod conditional;
pub mod error;
pub mod list;
pub mod memo;
pub mod prop;
pub mod render;
pub mod shallow;
pub mod switch;
pub mod try_catch;

pub use awaiting::{AsyncState, Await, AwaitDefaults, await_defaults, with_await_defaults};
pub use bare::{Bare, BareInstance, Constructor, UpdateGuard};
pub use conditional::{If, IfElse};
pub use error::FlowError;
pub use list::{Map, MapKeyed};
pub use memo::{Deps, Memo, deps_changed};
pub use prop::Prop;
pub use render::{Render, Test};
pub use shallow::{shallow_different, shallow_equal};
pub use switch::{Case, Switch, When};
pub use try_catch::TryCatch;
