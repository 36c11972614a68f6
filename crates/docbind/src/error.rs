//! Error types for model building, encoding, and decoding.

use thiserror::Error;

use crate::doc::ElementType;

/// Error while building a type model or resolving a codec.
///
/// These are programming errors in the registration surface: they are
/// surfaced once, at the first resolution of the offending type, and
/// never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("conventions declined to map type {type_name}")]
    NotMappable { type_name: &'static str },

    #[error("map keys must be String; field {field} declares {key_type}")]
    MapKeyNotString {
        field: String,
        key_type: &'static str,
    },

    #[error("type name {name} is registered more than once")]
    DuplicateTypeName { name: &'static str },

    #[error("type {type_name} is registered more than once")]
    DuplicateRegistration { type_name: &'static str },

    #[error("{type_name} declares field {field} more than once")]
    DuplicateField {
        type_name: &'static str,
        field: String,
    },

    #[error("type parameter index {index} out of range ({available} bound)")]
    ParameterOutOfRange { index: usize, available: usize },

    #[error("model for {type_name} still contains unbound type parameters")]
    UnboundParameter { type_name: &'static str },
}

/// Error during binary decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("varint exceeds maximum length (10 bytes)")]
    VarintTooLong,

    #[error("varint overflow (value exceeds u64)")]
    VarintOverflow,

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("invalid element tag: {tag:#04x}")]
    InvalidElementTag { tag: u8 },

    #[error("invalid bool value: {value} (expected 0x00 or 0x01)")]
    InvalidBool { value: u8 },

    #[error("int32 value {value} out of range")]
    Int32OutOfRange { value: i64 },

    #[error("nested value exceeds maximum skip depth {max}")]
    SkipDepthExceeded { max: usize },

    #[error("expected {expected}, found {found:?} element")]
    UnexpectedElement {
        expected: &'static str,
        found: ElementType,
    },

    #[error("document field {field} has no mapping in {type_name}")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },

    #[error("discriminator names unknown type {name}")]
    UnknownTypeName { name: String },

    #[error("discriminator field must be a string, found {found:?}")]
    InvalidDiscriminator { found: ElementType },

    #[error("no type discriminator in {context}")]
    MissingDiscriminator { context: &'static str },

    #[error("no codec registered for type {type_name}")]
    NoCodecForType { type_name: &'static str },

    #[error("value is not a {expected} in {context}")]
    ValueTypeMismatch {
        expected: &'static str,
        context: &'static str,
    },

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// Error during encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("no codec registered for type {type_name}")]
    NoCodecForType { type_name: &'static str },

    #[error("no codec registered for the value's runtime type (declared {declared})")]
    NoCodecForRuntimeType { declared: &'static str },

    #[error("value is not a {expected} in {context}")]
    ValueTypeMismatch {
        expected: &'static str,
        context: &'static str,
    },

    #[error(transparent)]
    Mapping(#[from] MappingError),
}
