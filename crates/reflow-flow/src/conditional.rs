use reflow_core::{View, group, with_key};

use crate::{Render, Test};

/// Renders `then` when `test` holds, nothing otherwise.
pub fn If(test: impl Into<Test>, then: impl Into<Render<()>>) -> View {
    IfElse(test, then, Render::empty())
}

/// Renders `then` when `test` holds and `otherwise` when it does not.
///
/// `test` is evaluated exactly once per composition. Each branch is composed
/// under its own key, so flipping the condition tears down the state of the
/// branch that is no longer shown.
pub fn IfElse(
    test: impl Into<Test>,
    then: impl Into<Render<()>>,
    otherwise: impl Into<Render<()>>,
) -> View {
    let test = test.into();
    let then = then.into();
    let otherwise = otherwise.into();
    group(|| {
        if test.eval() {
            with_key("then", || then.render())
        } else {
            with_key("else", || otherwise.render())
        }
    })
}
