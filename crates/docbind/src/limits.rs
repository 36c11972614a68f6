//! Security limits for decoding untrusted documents.
//!
//! All allocations made while decoding are bounded by these constants;
//! oversized input is rejected with a descriptive error instead of
//! exhausting memory.

/// Maximum bytes in a varint (64-bit value).
pub const MAX_VARINT_BYTES: usize = 10;

/// Maximum length of an element name in bytes.
pub const MAX_NAME_LEN: usize = 1024;

/// Maximum length of a string value in bytes (16 MiB).
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Maximum nesting depth when skipping an unrecognized value.
pub const MAX_SKIP_DEPTH: usize = 64;
