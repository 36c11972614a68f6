//! Codec layer: engines, registry, and the wire value codecs.

pub mod engine;
pub mod registry;
pub(crate) mod scalar;
pub(crate) mod value;

pub use engine::EntityCodec;
pub use registry::{CodecRegistry, RegistryBuilder};

/// Document element carrying the wire type name of the encoded value.
/// Written first by every engine; accepted at any position on decode.
pub const TYPE_DISCRIMINATOR: &str = "_t";
