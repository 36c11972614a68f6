//! The per-type codec engine: encodes and decodes one mapped type.
//!
//! Every engine owns one [`TypeModel`] and a pair of monomorphized entry
//! points into the backing type: a `Default` constructor and an upcast into
//! `Box<dyn Entity>`. Encoding is a straight walk over the model's fields;
//! decoding starts from a fresh default value and hydrates whichever fields
//! the document carries, in document order.
//!
//! Documents are self-describing through the `_t` discriminator element.
//! An engine asked to decode a document that names a different type scans
//! the discriminator first (with a mark/reset, so nothing is consumed) and
//! hands the document to the named type's engine.

use std::any::Any;
use std::fmt;

use tracing::trace;

use crate::codec::TYPE_DISCRIMINATOR;
use crate::codec::registry::CodecRegistry;
use crate::codec::value::{decode_value, encode_value};
use crate::doc::{DocReader, DocWriter, ElementType};
use crate::error::{DecodeError, EncodeError, MappingError};
use crate::model::{Entity, TypeKey, TypeModel};

fn construct_default<T: Any + Send + Default>() -> Box<dyn Any> {
    Box::new(T::default())
}

fn upcast_entity<T: Any + Send>(value: Box<dyn Any>) -> Result<Box<dyn Entity>, DecodeError> {
    let value = value
        .downcast::<T>()
        .map_err(|_| DecodeError::ValueTypeMismatch {
            expected: std::any::type_name::<T>(),
            context: "entity upcast",
        })?;
    let entity: Box<dyn Entity> = value;
    Ok(entity)
}

/// Codec engine for one registered backing type.
pub struct EntityCodec {
    model: TypeModel,
    construct: fn() -> Box<dyn Any>,
    upcast: fn(Box<dyn Any>) -> Result<Box<dyn Entity>, DecodeError>,
}

impl EntityCodec {
    pub(crate) fn new<T: Any + Send + Default>(model: TypeModel) -> Result<Self, MappingError> {
        if model.has_parameters() {
            return Err(MappingError::UnboundParameter {
                type_name: model.key().name(),
            });
        }
        Ok(Self {
            model,
            construct: construct_default::<T>,
            upcast: upcast_entity::<T>,
        })
    }

    /// Identity of the backing type this engine serves.
    pub fn backing_type(&self) -> TypeKey {
        self.model.key()
    }

    /// The type model driving this engine.
    pub fn model(&self) -> &TypeModel {
        &self.model
    }

    pub(crate) fn upcast(&self) -> fn(Box<dyn Any>) -> Result<Box<dyn Entity>, DecodeError> {
        self.upcast
    }

    /// Decodes one document body, honoring a discriminator that names a
    /// different registered type.
    pub fn decode(
        &self,
        reader: &mut DocReader<'_>,
        registry: &CodecRegistry,
    ) -> Result<Box<dyn Any>, DecodeError> {
        if let Some(name) = scan_discriminator(reader)? {
            if name != self.model.key().name() {
                trace!(
                    declared = self.model.key().name(),
                    actual = %name,
                    "discriminator redirect"
                );
                let engine = registry.resolve_by_name(&name)?;
                return engine.decode_body(reader, registry);
            }
        }
        self.decode_body(reader, registry)
    }

    /// Decodes one document body as this engine's own type.
    ///
    /// Starts from `T::default()`; fields absent from the document keep
    /// their default values, and a field name without a mapping is an
    /// error. The discriminator element is accepted at any position.
    pub(crate) fn decode_body(
        &self,
        reader: &mut DocReader<'_>,
        registry: &CodecRegistry,
    ) -> Result<Box<dyn Any>, DecodeError> {
        let mut entity = (self.construct)();
        while let Some(element) = reader.next_element()? {
            if element.name == TYPE_DISCRIMINATOR {
                reader.skip_value(element.tag)?;
                continue;
            }
            let field = self.model.field(&element.name).ok_or_else(|| {
                DecodeError::UnknownField {
                    type_name: self.model.key().name(),
                    field: element.name.clone(),
                }
            })?;
            let mut value = decode_value(reader, element.tag, field.shape(), registry)?;
            if let Some(converter) = field.converter() {
                value = converter.from_wire(value);
            }
            field.set(entity.as_mut(), value)?;
        }
        Ok(entity)
    }

    /// Encodes a value whose runtime type may be this engine's own or any
    /// other registered type.
    pub fn encode(
        &self,
        writer: &mut DocWriter,
        value: &dyn Any,
        registry: &CodecRegistry,
    ) -> Result<(), EncodeError> {
        if value.type_id() == self.model.key().id() {
            return self.encode_body(writer, value, registry);
        }
        // The runtime type is the missing one here; this engine's own
        // type is only the declared starting point.
        let engine = registry
            .resolve(value.type_id())?
            .ok_or(EncodeError::NoCodecForRuntimeType {
                declared: self.model.key().name(),
            })?;
        engine.encode_body(writer, value, registry)
    }

    /// Writes the document body: discriminator first, then every mapped
    /// field in model order, then the terminator.
    pub(crate) fn encode_body(
        &self,
        writer: &mut DocWriter,
        value: &dyn Any,
        registry: &CodecRegistry,
    ) -> Result<(), EncodeError> {
        writer.write_string(TYPE_DISCRIMINATOR, self.model.key().name());
        for field in self.model.fields() {
            let borrowed = field.get(value)?;
            match field.converter() {
                Some(converter) => {
                    let owned = converter.to_wire(borrowed);
                    encode_value(writer, field.wire_name(), field.shape(), owned.as_ref(), registry)?;
                }
                None => {
                    encode_value(writer, field.wire_name(), field.shape(), borrowed, registry)?;
                }
            }
        }
        writer.end_document();
        Ok(())
    }
}

impl fmt::Display for EntityCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityCodec<{}>", self.model.key().name())
    }
}

/// Scans ahead in the current document for the discriminator element and
/// returns its value, restoring the read position either way.
///
/// Elements before the discriminator are skipped structurally, whatever
/// their shape, so the scan works on documents of unrecognized types.
pub(crate) fn scan_discriminator(
    reader: &mut DocReader<'_>,
) -> Result<Option<String>, DecodeError> {
    let mark = reader.mark();
    while let Some(element) = reader.next_element()? {
        if element.name == TYPE_DISCRIMINATOR {
            if element.tag != ElementType::String {
                return Err(DecodeError::InvalidDiscriminator { found: element.tag });
            }
            let name = reader.read_string()?;
            reader.reset(mark);
            return Ok(Some(name));
        }
        reader.skip_value(element.tag)?;
    }
    reader.reset(mark);
    Ok(None)
}
