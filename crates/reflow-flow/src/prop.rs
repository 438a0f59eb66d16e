use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Dynamically typed prop value.
///
/// Used wherever a component compares inputs across frames without knowing
/// their type: `Bare::pure_by`, `Memo` dependencies, and truthiness tests.
/// Scalars compare by value; arrays, objects and opaque values compare by
/// identity of their shared allocation.
#[derive(Clone, Default)]
pub enum Prop {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Array(Rc<[Prop]>),
    Object(Rc<BTreeMap<String, Prop>>),
    Opaque(Rc<dyn Any>),
}

impl Prop {
    pub fn array(items: impl IntoIterator<Item = impl Into<Prop>>) -> Self {
        Prop::Array(items.into_iter().map(Into::into).collect())
    }

    pub fn object<K: Into<String>, V: Into<Prop>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Prop::Object(Rc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    pub fn opaque<T: Any>(value: T) -> Self {
        Prop::Opaque(Rc::new(value))
    }

    /// SameValue equality: NaN equals NaN, +0 differs from -0, shared values
    /// compare by identity.
    pub fn same_value(&self, other: &Prop) -> bool {
        match (self, other) {
            (Prop::Undefined, Prop::Undefined) | (Prop::Null, Prop::Null) => true,
            (Prop::Bool(a), Prop::Bool(b)) => a == b,
            (Prop::Number(a), Prop::Number(b)) => {
                (a.is_nan() && b.is_nan())
                    || (a == b && a.is_sign_negative() == b.is_sign_negative())
            }
            (Prop::Str(a), Prop::Str(b)) => a == b,
            (Prop::Array(a), Prop::Array(b)) => Rc::ptr_eq(a, b),
            (Prop::Object(a), Prop::Object(b)) => Rc::ptr_eq(a, b),
            (Prop::Opaque(a), Prop::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Prop::Undefined | Prop::Null => false,
            Prop::Bool(b) => *b,
            Prop::Number(n) => *n != 0.0 && !n.is_nan(),
            Prop::Str(s) => !s.is_empty(),
            Prop::Array(_) | Prop::Object(_) | Prop::Opaque(_) => true,
        }
    }

    pub fn as_array(&self) -> Option<&[Prop]> {
        match self {
            Prop::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Prop::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Prop::Opaque(v) => v.downcast_ref(),
            _ => None,
        }
    }
}

impl PartialEq for Prop {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl fmt::Debug for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prop::Undefined => write!(f, "undefined"),
            Prop::Null => write!(f, "null"),
            Prop::Bool(b) => write!(f, "{b}"),
            Prop::Number(n) => write!(f, "{n}"),
            Prop::Str(s) => write!(f, "{s:?}"),
            Prop::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Prop::Object(map) => f.debug_map().entries(map.iter()).finish(),
            Prop::Opaque(v) => write!(f, "<opaque {:p}>", Rc::as_ptr(v)),
        }
    }
}

impl From<bool> for Prop {
    fn from(b: bool) -> Self {
        Prop::Bool(b)
    }
}

macro_rules! number_props {
    ($($t:ty),*) => {
        $(impl From<$t> for Prop {
            fn from(n: $t) -> Self {
                Prop::Number(n as f64)
            }
        })*
    };
}

number_props!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl From<&str> for Prop {
    fn from(s: &str) -> Self {
        Prop::Str(s.into())
    }
}

impl From<String> for Prop {
    fn from(s: String) -> Self {
        Prop::Str(s.into())
    }
}

impl From<()> for Prop {
    fn from(_: ()) -> Self {
        Prop::Undefined
    }
}

impl<T: Into<Prop>> From<Option<T>> for Prop {
    fn from(v: Option<T>) -> Self {
        v.map_or(Prop::Undefined, Into::into)
    }
}

impl<T: Into<Prop>> From<Vec<T>> for Prop {
    fn from(v: Vec<T>) -> Self {
        Prop::array(v)
    }
}

impl<T: Into<Prop>, const N: usize> From<[T; N]> for Prop {
    fn from(v: [T; N]) -> Self {
        Prop::array(v)
    }
}
