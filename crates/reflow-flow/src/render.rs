use std::rc::Rc;

use reflow_core::View;

use crate::Prop;

/// Something that produces a view: a ready-made view, a thunk, or a function
/// of an argument supplied by the component (a resolved value, an error, the
/// owning instance).
pub enum Render<A> {
    Static(View),
    Lazy(Rc<dyn Fn() -> View>),
    With(Rc<dyn Fn(&A) -> View>),
}

impl<A> Clone for Render<A> {
    fn clone(&self) -> Self {
        match self {
            Render::Static(v) => Render::Static(v.clone()),
            Render::Lazy(f) => Render::Lazy(f.clone()),
            Render::With(f) => Render::With(f.clone()),
        }
    }
}

impl<A> Render<A> {
    pub fn empty() -> Self {
        Render::Static(View::empty())
    }

    pub fn lazy(f: impl Fn() -> View + 'static) -> Self {
        Render::Lazy(Rc::new(f))
    }

    pub fn with(f: impl Fn(&A) -> View + 'static) -> Self {
        Render::With(Rc::new(f))
    }

    /// Resolves to a view. A `With` function given no argument yields the
    /// empty view rather than being called.
    pub fn eval(&self, arg: Option<&A>) -> View {
        match self {
            Render::Static(v) => v.clone(),
            Render::Lazy(f) => f(),
            Render::With(f) => arg.map_or_else(View::empty, |a| f(a)),
        }
    }
}

impl Render<()> {
    pub fn render(&self) -> View {
        self.eval(Some(&()))
    }
}

impl<A> Default for Render<A> {
    fn default() -> Self {
        Render::empty()
    }
}

impl<A> From<View> for Render<A> {
    fn from(v: View) -> Self {
        Render::Static(v)
    }
}

impl<A> From<&str> for Render<A> {
    fn from(s: &str) -> Self {
        Render::Static(View::from(s))
    }
}

impl<A> From<String> for Render<A> {
    fn from(s: String) -> Self {
        Render::Static(View::from(s))
    }
}

/// Condition of an `If` or a `When` case: a fixed value or a predicate.
#[derive(Clone)]
pub enum Test {
    Static(bool),
    Predicate(Rc<dyn Fn() -> bool>),
}

impl Test {
    pub fn when(f: impl Fn() -> bool + 'static) -> Self {
        Test::Predicate(Rc::new(f))
    }

    /// Calls the predicate exactly once.
    pub fn eval(&self) -> bool {
        match self {
            Test::Static(b) => *b,
            Test::Predicate(f) => f(),
        }
    }
}

impl From<bool> for Test {
    fn from(b: bool) -> Self {
        Test::Static(b)
    }
}

impl From<Prop> for Test {
    fn from(p: Prop) -> Self {
        Test::Static(p.is_truthy())
    }
}

impl From<&Prop> for Test {
    fn from(p: &Prop) -> Self {
        Test::Static(p.is_truthy())
    }
}
