//! Element-level document reader.
//!
//! A document is an ordered sequence of named, tagged elements terminated
//! by an end tag. Nested documents and arrays carry the same layout; array
//! item names are decimal indexes and are ignored on decode.

use crate::doc::primitives::Reader;
use crate::error::DecodeError;
use crate::limits::{MAX_NAME_LEN, MAX_SKIP_DEPTH, MAX_STRING_LEN};

/// Wire tags for document elements.
///
/// The numbering follows the BSON element types for the subset of kinds
/// this format supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    /// End of a document or array region.
    End = 0x00,
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Bool = 0x08,
    Int32 = 0x10,
    Int64 = 0x12,
}

impl ElementType {
    /// Creates an ElementType from its wire representation.
    pub fn from_u8(v: u8) -> Option<ElementType> {
        match v {
            0x00 => Some(ElementType::End),
            0x01 => Some(ElementType::Double),
            0x02 => Some(ElementType::String),
            0x03 => Some(ElementType::Document),
            0x04 => Some(ElementType::Array),
            0x08 => Some(ElementType::Bool),
            0x10 => Some(ElementType::Int32),
            0x12 => Some(ElementType::Int64),
            _ => None,
        }
    }
}

/// Header of one document element: its wire tag and field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: ElementType,
    pub name: String,
}

/// A saved reader position for lookahead scans.
#[derive(Debug, Clone, Copy)]
pub struct Mark(usize);

/// Reader for walking a document element by element.
///
/// Supports `mark`/`reset` so a caller can scan ahead (for the type
/// discriminator) without consuming input.
#[derive(Debug, Clone)]
pub struct DocReader<'a> {
    inner: Reader<'a>,
}

impl<'a> DocReader<'a> {
    /// Creates a reader positioned at the start of a root document body.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Reader::new(data),
        }
    }

    /// Returns the current byte position.
    pub fn position(&self) -> usize {
        self.inner.position()
    }

    /// Returns true if all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Saves the current position.
    pub fn mark(&self) -> Mark {
        Mark(self.inner.position())
    }

    /// Rewinds to a previously saved position.
    pub fn reset(&mut self, mark: Mark) {
        self.inner.set_position(mark.0);
    }

    /// Reads the next element header in the current region.
    ///
    /// Returns `None` once the region's end tag has been consumed.
    pub fn next_element(&mut self) -> Result<Option<Element>, DecodeError> {
        let byte = self.inner.read_byte("element tag")?;
        if byte == ElementType::End as u8 {
            return Ok(None);
        }
        let tag = ElementType::from_u8(byte).ok_or(DecodeError::InvalidElementTag { tag: byte })?;
        let name = self.inner.read_string(MAX_NAME_LEN, "element name")?;
        Ok(Some(Element { tag, name }))
    }

    /// Reads a double payload.
    pub fn read_double(&mut self) -> Result<f64, DecodeError> {
        self.inner.read_f64("double value")
    }

    /// Reads a string payload.
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        self.inner.read_string(MAX_STRING_LEN, "string value")
    }

    /// Reads a bool payload.
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        let byte = self.inner.read_byte("bool value")?;
        match byte {
            0x00 => Ok(false),
            0x01 => Ok(true),
            _ => Err(DecodeError::InvalidBool { value: byte }),
        }
    }

    /// Reads an int32 payload.
    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        let value = self.inner.read_signed_varint("int32 value")?;
        i32::try_from(value).map_err(|_| DecodeError::Int32OutOfRange { value })
    }

    /// Reads an int64 payload.
    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        self.inner.read_signed_varint("int64 value")
    }

    /// Skips over one value of the given tag without interpreting it.
    ///
    /// Documents and arrays are skipped recursively, bounded by
    /// [`MAX_SKIP_DEPTH`].
    pub fn skip_value(&mut self, tag: ElementType) -> Result<(), DecodeError> {
        self.skip_value_at(tag, 0)
    }

    fn skip_value_at(&mut self, tag: ElementType, depth: usize) -> Result<(), DecodeError> {
        match tag {
            ElementType::End => Ok(()),
            ElementType::Double => self.inner.read_bytes(8, "skipped double").map(|_| ()),
            ElementType::String => {
                let len = self.inner.read_varint("skipped string")? as usize;
                self.inner.read_bytes(len, "skipped string").map(|_| ())
            }
            ElementType::Bool => self.inner.read_byte("skipped bool").map(|_| ()),
            ElementType::Int32 | ElementType::Int64 => {
                self.inner.read_varint("skipped int").map(|_| ())
            }
            ElementType::Document | ElementType::Array => {
                if depth >= MAX_SKIP_DEPTH {
                    return Err(DecodeError::SkipDepthExceeded {
                        max: MAX_SKIP_DEPTH,
                    });
                }
                while let Some(element) = self.next_element()? {
                    self.skip_value_at(element.tag, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}
