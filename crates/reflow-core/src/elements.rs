#![allow(non_snake_case)]
//! Plain view constructors used by the control-flow components and tests.

use crate::{View, ViewKind};

pub fn Text(text: impl Into<String>) -> View {
    View::new(ViewKind::Text { text: text.into() })
}

pub fn Element(tag: impl Into<String>) -> View {
    View::new(ViewKind::Element { tag: tag.into() })
}

/// Groups children without adding a node of its own.
pub fn Fragment(children: impl IntoIterator<Item = View>) -> View {
    View::new(ViewKind::Group).with_children(children.into_iter().collect())
}
