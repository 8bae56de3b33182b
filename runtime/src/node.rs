//! Base capability of generated entity types.
//!
//! Concrete entities implement `Node` directly; each virtual entity becomes a
//! trait whose root supertrait is `Node`, so any `Box<dyn Virtual>` can be
//! printed, debugged and downcast back to its concrete type.

use std::any::Any;
use std::fmt;

pub trait Node: fmt::Debug + fmt::Display + Any {
    fn as_any(&self) -> &dyn Any;
}

/// Recover the concrete entity behind a capability object.
pub fn downcast<T: Node>(node: &dyn Node) -> Option<&T> {
    node.as_any().downcast_ref::<T>()
}
