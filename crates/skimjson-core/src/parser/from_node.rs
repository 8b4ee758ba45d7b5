//! Typed conversion out of a [`Node`]

use super::node::{Node, NodeKind};

/// Conversion from a resolved node into a Rust value
///
/// Conversions check the node kind first and fail on mismatch; integers fail
/// rather than truncate when out of range.
pub trait FromNode<'a>: Sized {
    /// Convert `node`, or `None` if the kind or range does not fit
    fn from_node(node: Node<'a>) -> Option<Self>;
}

macro_rules! impl_signed {
    ($($ty:ty),*) => {
        $(
            impl<'a> FromNode<'a> for $ty {
                fn from_node(node: Node<'a>) -> Option<Self> {
                    <$ty>::try_from(node.as_i64()?).ok()
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($ty:ty),*) => {
        $(
            impl<'a> FromNode<'a> for $ty {
                fn from_node(node: Node<'a>) -> Option<Self> {
                    <$ty>::try_from(node.as_u64()?).ok()
                }
            }
        )*
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl<'a> FromNode<'a> for f64 {
    fn from_node(node: Node<'a>) -> Option<Self> {
        node.as_f64()
    }
}

impl<'a> FromNode<'a> for f32 {
    fn from_node(node: Node<'a>) -> Option<Self> {
        node.as_f64().map(|f| f as f32)
    }
}

impl<'a> FromNode<'a> for bool {
    fn from_node(node: Node<'a>) -> Option<Self> {
        node.as_bool()
    }
}

/// Verbatim string contents, escapes undecoded
impl<'a> FromNode<'a> for &'a str {
    fn from_node(node: Node<'a>) -> Option<Self> {
        node.as_str()
    }
}

/// Decoded string contents
impl<'a> FromNode<'a> for String {
    fn from_node(node: Node<'a>) -> Option<Self> {
        node.unescaped_string()
    }
}

impl<'a> FromNode<'a> for Node<'a> {
    fn from_node(node: Node<'a>) -> Option<Self> {
        node.is_valid().then_some(node)
    }
}

/// `null` converts to `Some(None)`
impl<'a, T: FromNode<'a>> FromNode<'a> for Option<T> {
    fn from_node(node: Node<'a>) -> Option<Self> {
        match node.kind() {
            NodeKind::Null => Some(None),
            _ => T::from_node(node).map(Some),
        }
    }
}

/// Every element must convert
impl<'a, T: FromNode<'a>> FromNode<'a> for Vec<T> {
    fn from_node(node: Node<'a>) -> Option<Self> {
        if node.kind() != NodeKind::Array {
            return None;
        }
        let mut elements = node.elements();
        let items = elements
            .by_ref()
            .map(T::from_node)
            .collect::<Option<Vec<_>>>()?;
        (!elements.is_malformed()).then_some(items)
    }
}

impl<'a> FromNode<'a> for serde_json::Value {
    fn from_node(node: Node<'a>) -> Option<Self> {
        crate::materialize::materialize(node)
    }
}
