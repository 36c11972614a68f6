//! Built-in scalar codecs for the leaf value types.

use std::any::{Any, TypeId};

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::doc::{DocReader, DocWriter, ElementType};
use crate::error::{DecodeError, EncodeError};

/// One wire scalar: a fixed element type plus its value codec.
pub(crate) trait ScalarCodec: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn element_type(&self) -> ElementType;
    fn encode(
        &self,
        writer: &mut DocWriter,
        name: &str,
        value: &dyn Any,
    ) -> Result<(), EncodeError>;
    fn decode(
        &self,
        reader: &mut DocReader<'_>,
        tag: ElementType,
    ) -> Result<Box<dyn Any>, DecodeError>;
}

fn scalar_mismatch(expected: &'static str) -> EncodeError {
    EncodeError::ValueTypeMismatch {
        expected,
        context: "scalar encode",
    }
}

fn check_tag(codec: &dyn ScalarCodec, tag: ElementType) -> Result<(), DecodeError> {
    if tag == codec.element_type() {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedElement {
            expected: codec.type_name(),
            found: tag,
        })
    }
}

struct StringCodec;

impl ScalarCodec for StringCodec {
    fn type_name(&self) -> &'static str {
        "String"
    }

    fn element_type(&self) -> ElementType {
        ElementType::String
    }

    fn encode(
        &self,
        writer: &mut DocWriter,
        name: &str,
        value: &dyn Any,
    ) -> Result<(), EncodeError> {
        let value = value
            .downcast_ref::<String>()
            .ok_or_else(|| scalar_mismatch("String"))?;
        writer.write_string(name, value);
        Ok(())
    }

    fn decode(
        &self,
        reader: &mut DocReader<'_>,
        tag: ElementType,
    ) -> Result<Box<dyn Any>, DecodeError> {
        check_tag(self, tag)?;
        Ok(Box::new(reader.read_string()?))
    }
}

struct Int32Codec;

impl ScalarCodec for Int32Codec {
    fn type_name(&self) -> &'static str {
        "i32"
    }

    fn element_type(&self) -> ElementType {
        ElementType::Int32
    }

    fn encode(
        &self,
        writer: &mut DocWriter,
        name: &str,
        value: &dyn Any,
    ) -> Result<(), EncodeError> {
        let value = value
            .downcast_ref::<i32>()
            .ok_or_else(|| scalar_mismatch("i32"))?;
        writer.write_i32(name, *value);
        Ok(())
    }

    fn decode(
        &self,
        reader: &mut DocReader<'_>,
        tag: ElementType,
    ) -> Result<Box<dyn Any>, DecodeError> {
        check_tag(self, tag)?;
        Ok(Box::new(reader.read_i32()?))
    }
}

struct Int64Codec;

impl ScalarCodec for Int64Codec {
    fn type_name(&self) -> &'static str {
        "i64"
    }

    fn element_type(&self) -> ElementType {
        ElementType::Int64
    }

    fn encode(
        &self,
        writer: &mut DocWriter,
        name: &str,
        value: &dyn Any,
    ) -> Result<(), EncodeError> {
        let value = value
            .downcast_ref::<i64>()
            .ok_or_else(|| scalar_mismatch("i64"))?;
        writer.write_i64(name, *value);
        Ok(())
    }

    fn decode(
        &self,
        reader: &mut DocReader<'_>,
        tag: ElementType,
    ) -> Result<Box<dyn Any>, DecodeError> {
        check_tag(self, tag)?;
        Ok(Box::new(reader.read_i64()?))
    }
}

struct DoubleCodec;

impl ScalarCodec for DoubleCodec {
    fn type_name(&self) -> &'static str {
        "f64"
    }

    fn element_type(&self) -> ElementType {
        ElementType::Double
    }

    fn encode(
        &self,
        writer: &mut DocWriter,
        name: &str,
        value: &dyn Any,
    ) -> Result<(), EncodeError> {
        let value = value
            .downcast_ref::<f64>()
            .ok_or_else(|| scalar_mismatch("f64"))?;
        writer.write_double(name, *value);
        Ok(())
    }

    fn decode(
        &self,
        reader: &mut DocReader<'_>,
        tag: ElementType,
    ) -> Result<Box<dyn Any>, DecodeError> {
        check_tag(self, tag)?;
        Ok(Box::new(reader.read_double()?))
    }
}

struct BoolCodec;

impl ScalarCodec for BoolCodec {
    fn type_name(&self) -> &'static str {
        "bool"
    }

    fn element_type(&self) -> ElementType {
        ElementType::Bool
    }

    fn encode(
        &self,
        writer: &mut DocWriter,
        name: &str,
        value: &dyn Any,
    ) -> Result<(), EncodeError> {
        let value = value
            .downcast_ref::<bool>()
            .ok_or_else(|| scalar_mismatch("bool"))?;
        writer.write_bool(name, *value);
        Ok(())
    }

    fn decode(
        &self,
        reader: &mut DocReader<'_>,
        tag: ElementType,
    ) -> Result<Box<dyn Any>, DecodeError> {
        check_tag(self, tag)?;
        Ok(Box::new(reader.read_bool()?))
    }
}

lazy_static! {
    static ref SCALAR_CODECS: FxHashMap<TypeId, &'static dyn ScalarCodec> = {
        let mut m: FxHashMap<TypeId, &'static dyn ScalarCodec> = FxHashMap::default();
        m.insert(TypeId::of::<String>(), &StringCodec);
        m.insert(TypeId::of::<i32>(), &Int32Codec);
        m.insert(TypeId::of::<i64>(), &Int64Codec);
        m.insert(TypeId::of::<f64>(), &DoubleCodec);
        m.insert(TypeId::of::<bool>(), &BoolCodec);
        m
    };
}

/// Looks up the built-in scalar codec for a leaf value type, if one exists.
pub(crate) fn scalar_codec(id: TypeId) -> Option<&'static dyn ScalarCodec> {
    SCALAR_CODECS.get(&id).copied()
}
