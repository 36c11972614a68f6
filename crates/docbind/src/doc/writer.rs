//! Element-level document writer.
//!
//! Mirrors [`DocReader`](crate::doc::DocReader): every element is written
//! as tag + name + payload, and document/array regions are closed with an
//! end tag. The element header of a nested region is written by its
//! container; the body writes its own terminator. A root document is a
//! bare body.

use crate::doc::primitives::Writer;
use crate::doc::reader::ElementType;

/// Writer for producing a document byte stream.
#[derive(Debug, Clone, Default)]
pub struct DocWriter {
    inner: Writer,
}

impl DocWriter {
    /// Creates a writer positioned at the start of a root document body.
    pub fn new() -> Self {
        Self {
            inner: Writer::new(),
        }
    }

    /// Creates a writer with a pre-allocated buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Writer::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_bytes()
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn element(&mut self, tag: ElementType, name: &str) {
        self.inner.write_byte(tag as u8);
        self.inner.write_string(name);
    }

    /// Writes a named double element.
    pub fn write_double(&mut self, name: &str, value: f64) {
        self.element(ElementType::Double, name);
        self.inner.write_f64(value);
    }

    /// Writes a named string element.
    pub fn write_string(&mut self, name: &str, value: &str) {
        self.element(ElementType::String, name);
        self.inner.write_string(value);
    }

    /// Writes a named bool element.
    pub fn write_bool(&mut self, name: &str, value: bool) {
        self.element(ElementType::Bool, name);
        self.inner.write_byte(u8::from(value));
    }

    /// Writes a named int32 element.
    pub fn write_i32(&mut self, name: &str, value: i32) {
        self.element(ElementType::Int32, name);
        self.inner.write_signed_varint(i64::from(value));
    }

    /// Writes a named int64 element.
    pub fn write_i64(&mut self, name: &str, value: i64) {
        self.element(ElementType::Int64, name);
        self.inner.write_signed_varint(value);
    }

    /// Opens a nested document region under the given name.
    pub fn begin_document(&mut self, name: &str) {
        self.element(ElementType::Document, name);
    }

    /// Opens a nested array region under the given name.
    pub fn begin_array(&mut self, name: &str) {
        self.element(ElementType::Array, name);
    }

    /// Closes the current document region (also terminates a root body).
    pub fn end_document(&mut self) {
        self.inner.write_byte(ElementType::End as u8);
    }

    /// Closes the current array region.
    pub fn end_array(&mut self) {
        self.inner.write_byte(ElementType::End as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let mut writer = DocWriter::new();
        writer.end_document();
        assert_eq!(writer.as_bytes(), &[0x00]);
    }

    #[test]
    fn test_element_layout() {
        let mut writer = DocWriter::new();
        writer.write_bool("ok", true);
        writer.end_document();

        // tag, name length, name bytes, payload, end tag
        assert_eq!(writer.as_bytes(), &[0x08, 0x02, b'o', b'k', 0x01, 0x00]);
    }

    #[test]
    fn test_nested_region_layout() {
        let mut writer = DocWriter::new();
        writer.begin_array("a");
        writer.write_i32("0", 1);
        writer.end_array();
        writer.end_document();

        assert_eq!(
            writer.as_bytes(),
            &[0x04, 0x01, b'a', 0x10, 0x01, b'0', 0x02, 0x00, 0x00]
        );
    }
}
