//! Document reader/writer for the binary wire format.
//!
//! This module is the streaming collaborator the codec engine drives:
//! byte-level primitives in [`primitives`], element-level region walking
//! in [`reader`] and [`writer`].

pub mod primitives;
pub mod reader;
pub mod writer;

pub use primitives::{Reader, Writer, zigzag_decode, zigzag_encode};
pub use reader::{DocReader, Element, ElementType, Mark};
pub use writer::DocWriter;
