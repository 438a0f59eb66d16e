use reflow_core::{View, group, with_key};

use crate::{Render, Test};

/// One entry of a [`Switch`].
pub enum Case {
    When { test: Test, render: Render<()> },
    /// Anything that is not a `When` case. Skipped by `Switch`.
    Other(View),
}

pub fn When(test: impl Into<Test>, render: impl Into<Render<()>>) -> Case {
    Case::When {
        test: test.into(),
        render: render.into(),
    }
}

impl From<View> for Case {
    fn from(v: View) -> Self {
        Case::Other(v)
    }
}

/// Renders the first `When` case whose test holds, in declaration order.
///
/// Tests after the first match are not evaluated. Nothing is rendered when
/// no case matches.
pub fn Switch(cases: impl IntoIterator<Item = Case>) -> View {
    group(|| {
        for (i, case) in cases.into_iter().enumerate() {
            match case {
                Case::When { test, render } => {
                    if test.eval() {
                        return with_key(i.to_string(), || render.render());
                    }
                }
                Case::Other(_) => log::trace!("Switch: skipping non-When case {i}"),
            }
        }
        View::empty()
    })
}
