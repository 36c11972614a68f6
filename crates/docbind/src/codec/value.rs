//! Shape-driven encoding and decoding of one field value.
//!
//! Walks a [`FieldShape`] tree against a value: leaves defer to the scalar
//! table or a registered engine, containers recurse one region deeper.
//! Encode dispatches on the value's runtime type, decode on the declared
//! shape, so a leaf field declared as one registered type can round-trip a
//! value of another.

use std::any::Any;

use crate::codec::registry::CodecRegistry;
use crate::codec::scalar::scalar_codec;
use crate::doc::{DocReader, DocWriter, ElementType};
use crate::error::{DecodeError, EncodeError, MappingError};
use crate::model::Entity;
use crate::model::shape::{FieldShape, ShapeNode};

pub(crate) fn encode_value(
    writer: &mut DocWriter,
    name: &str,
    shape: &FieldShape,
    value: &dyn Any,
    registry: &CodecRegistry,
) -> Result<(), EncodeError> {
    match &shape.node {
        ShapeNode::Leaf { type_name, .. } => {
            // Runtime type, not declared type: the value may be any
            // registered type the field was handed.
            let runtime = value.type_id();
            if let Some(codec) = scalar_codec(runtime) {
                return codec.encode(writer, name, value);
            }
            let engine = registry
                .resolve(runtime)?
                .ok_or(EncodeError::NoCodecForType { type_name })?;
            writer.begin_document(name);
            engine.encode_body(writer, value, registry)
        }
        ShapeNode::Polymorphic => {
            let entity = value
                .downcast_ref::<Box<dyn Entity>>()
                .ok_or(EncodeError::ValueTypeMismatch {
                    expected: "Box<dyn Entity>",
                    context: "polymorphic field",
                })?;
            let inner = (**entity).as_any();
            let engine = registry
                .resolve(inner.type_id())?
                .ok_or(EncodeError::NoCodecForType {
                    type_name: "dyn Entity",
                })?;
            writer.begin_document(name);
            engine.encode_body(writer, inner, registry)
        }
        ShapeNode::Sequence { elem, ops } => {
            writer.begin_array(name);
            for (index, item) in (ops.iter)(value)?.into_iter().enumerate() {
                encode_value(writer, &index.to_string(), elem, item, registry)?;
            }
            writer.end_array();
            Ok(())
        }
        ShapeNode::Map { value: value_shape, ops, .. } => {
            writer.begin_document(name);
            for (key, entry) in (ops.entries)(value)? {
                encode_value(writer, key, value_shape, entry, registry)?;
            }
            writer.end_document();
            Ok(())
        }
        ShapeNode::Parameter(_) => Err(EncodeError::Mapping(MappingError::UnboundParameter {
            type_name: "unspecialized model",
        })),
    }
}

pub(crate) fn decode_value(
    reader: &mut DocReader<'_>,
    tag: ElementType,
    shape: &FieldShape,
    registry: &CodecRegistry,
) -> Result<Box<dyn Any>, DecodeError> {
    match &shape.node {
        ShapeNode::Leaf { id, type_name } => {
            if let Some(codec) = scalar_codec(*id) {
                return codec.decode(reader, tag);
            }
            let engine = registry
                .resolve(*id)?
                .ok_or(DecodeError::NoCodecForType { type_name })?;
            if tag != ElementType::Document {
                return Err(DecodeError::UnexpectedElement {
                    expected: type_name,
                    found: tag,
                });
            }
            engine.decode(reader, registry)
        }
        ShapeNode::Polymorphic => {
            if tag != ElementType::Document {
                return Err(DecodeError::UnexpectedElement {
                    expected: "document",
                    found: tag,
                });
            }
            let name = super::engine::scan_discriminator(reader)?.ok_or(
                DecodeError::MissingDiscriminator {
                    context: "polymorphic field",
                },
            )?;
            let engine = registry.resolve_by_name(&name)?;
            let entity = (engine.upcast())(engine.decode_body(reader, registry)?)?;
            Ok(Box::new(entity))
        }
        ShapeNode::Sequence { elem, ops } => {
            if tag != ElementType::Array {
                return Err(DecodeError::UnexpectedElement {
                    expected: "array",
                    found: tag,
                });
            }
            let mut container = (ops.new)();
            // Item names are positional and carry no information.
            while let Some(element) = reader.next_element()? {
                let item = decode_value(reader, element.tag, elem, registry)?;
                (ops.push)(container.as_mut(), item)?;
            }
            Ok(container)
        }
        ShapeNode::Map { value: value_shape, ops, .. } => {
            if tag != ElementType::Document {
                return Err(DecodeError::UnexpectedElement {
                    expected: "document",
                    found: tag,
                });
            }
            let mut container = (ops.new)();
            while let Some(element) = reader.next_element()? {
                let entry = decode_value(reader, element.tag, value_shape, registry)?;
                (ops.insert)(container.as_mut(), element.name, entry)?;
            }
            Ok(container)
        }
        ShapeNode::Parameter(_) => Err(DecodeError::Mapping(MappingError::UnboundParameter {
            type_name: "unspecialized model",
        })),
    }
}
