//! # Composition, State, and Effects
//!
//! Reflow composes an immutable `View` tree by calling plain functions once
//! per frame. The runtime keeps what has to outlive a frame:
//!
//! - `remember*`: storage bound to a position (or key) in the composition.
//! - `group` / `with_key`: nesting that decides what a slot belongs to.
//! - `MutableState<T>`: state whose writes schedule another frame.
//! - `disposable_effect` / `after_commit`: work that runs once a frame commits.
//! - `Promise<T, E>` and `spawn_local`: results produced on the task queue.
//!
//! ## Remembered state
//!
//! ```rust
//! use reflow_core::*;
//!
//! let mut rt = Runtime::new();
//! let build = || {
//!     let count = remember_state(|| 0);
//!     count.update_silent(|c| *c += 1);
//!     Text(format!("composed {} times", count.get()))
//! };
//! rt.compose(build);
//! let frame = rt.compose(build);
//! assert_eq!(frame.root.texts(), vec!["composed 2 times"]);
//! ```
//!
//! - `remember` is order-based inside its group: the Nth call always refers
//!   to the Nth stored value.
//! - `with_key` starts a keyed group, which keeps state attached to the key
//!   rather than the position. Use it around conditional branches.
//!
//! ## Teardown
//!
//! A group that is not composed during a frame is torn down when that frame
//! commits: its remembered values are dropped and its scope's disposers run,
//! children before parents.
//!
//! ## Effects and tasks
//!
//! Effects registered during composition run after the commit, in
//! composition order. Futures spawned with `spawn_local` and promise
//! callbacks make progress in `Runtime::run_until_stalled`; `Runtime::settle`
//! alternates between draining tasks and recomposing until nothing asks for a
//! new frame.

pub mod effects;
pub mod effects_ext;
pub mod elements;
pub mod error;
pub mod locals;
pub mod prelude;
pub mod promise;
pub mod runtime;
pub mod scope;
pub mod state;
pub mod task;
pub mod view;

#[cfg(test)]
mod tests;

pub use effects::*;
pub use effects_ext::*;
pub use elements::*;
pub use error::*;
pub use locals::*;
pub use promise::*;
pub use runtime::*;
pub use scope::*;
pub use state::*;
pub use task::*;
pub use view::*;
