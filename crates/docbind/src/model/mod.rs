//! Type models: how backing Rust types map onto wire documents.

pub mod entity;
pub mod field;
pub mod key;
pub mod shape;
pub mod type_model;

pub use entity::Entity;
pub use field::FieldModel;
pub use key::TypeKey;
pub use shape::FieldShape;
pub use type_model::{ModelBuilder, TypeModel};
