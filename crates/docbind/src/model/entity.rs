//! Type-erased handle for mapped values.

use std::any::Any;

/// Erasure trait for values that can live behind a polymorphic field.
///
/// Blanket-implemented for every `Any + Send` type, so user structs need
/// no manual impl; registration with the
/// [`CodecRegistry`](crate::codec::CodecRegistry) is what makes a type
/// encodable. Declare a field as `Box<dyn Entity>` to hold any registered
/// concrete type and round-trip it through the wire discriminator.
pub trait Entity: Any + Send {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any + Send> Entity for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
