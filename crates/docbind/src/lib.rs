//! docbind: model-driven binary document codec with polymorphic dispatch.
//!
//! This crate encodes plain Rust structs into a self-describing binary
//! document format and back, driven by explicitly registered type models
//! rather than derive macros.
//!
//! # Overview
//!
//! docbind is built around three pieces:
//! - **Type models**: an ordered field list per backing type, with typed
//!   accessors and a recursive shape tree per field
//! - **Conventions**: registry-wide policy for wire names, mappability,
//!   and value converters
//! - **The registry**: build-once, cached codec engines, shared across
//!   threads
//!
//! # Quick Start
//!
//! ```rust
//! use docbind::{DocReader, DocWriter, FieldShape, RegistryBuilder};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .register::<Point, _>("demo.Point", |b| {
//!         b.field(
//!             "x",
//!             FieldShape::leaf::<i64>(),
//!             |p: &Point| &p.x,
//!             |p: &mut Point, v: i64| p.x = v,
//!         )
//!         .field(
//!             "y",
//!             FieldShape::leaf::<i64>(),
//!             |p: &Point| &p.y,
//!             |p: &mut Point, v: i64| p.y = v,
//!         );
//!     })
//!     .build()
//!     .unwrap();
//!
//! let point = Point { x: 3, y: -4 };
//! let mut writer = DocWriter::new();
//! registry.encode(&mut writer, &point).unwrap();
//! let bytes = writer.into_bytes();
//!
//! let decoded: Point = registry.decode(&mut DocReader::new(&bytes)).unwrap();
//! assert_eq!(decoded, point);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Type models, field shapes, and the `Entity` erasure trait
//! - [`convention`]: Wire-name and converter policy
//! - [`codec`]: Codec engines, the registry, and value codecs
//! - [`doc`]: The binary document reader and writer
//! - [`error`]: Error types
//! - [`limits`]: Security limits for decoding
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted input:
//! - Name and string lengths are bounded by limits
//! - Varints are limited to prevent overflow
//! - Structural skipping is depth-bounded
//!
//! # Wire Format
//!
//! A document is a flat sequence of tagged, named elements terminated by a
//! zero byte. Nested documents and arrays open a region and share the same
//! element grammar; every encoded entity carries its wire type name in a
//! `_t` discriminator element, which is what makes polymorphic decode
//! possible.

pub mod codec;
pub mod convention;
pub mod doc;
pub mod error;
pub mod limits;
pub mod model;

// Re-export commonly used types at crate root
pub use codec::{CodecRegistry, EntityCodec, RegistryBuilder, TYPE_DISCRIMINATOR};
pub use convention::{CamelCaseConventions, Convention, ValueConverter};
pub use doc::{DocReader, DocWriter, Element, ElementType, Mark};
pub use error::{DecodeError, EncodeError, MappingError};
pub use model::{Entity, FieldModel, FieldShape, ModelBuilder, TypeKey, TypeModel};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
