//! Per-field mapping: wire name, erased accessors, converter, and shape.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::convention::ValueConverter;
use crate::error::{DecodeError, EncodeError};
use crate::model::shape::FieldShape;

pub(crate) type Getter =
    Arc<dyn for<'a> Fn(&'a dyn Any) -> Result<&'a dyn Any, EncodeError> + Send + Sync>;
pub(crate) type Setter =
    Arc<dyn Fn(&mut dyn Any, Box<dyn Any>) -> Result<(), DecodeError> + Send + Sync>;

// Funnel that forces higher-ranked lifetime inference on the closure.
fn getter_fn<F>(f: F) -> F
where
    F: for<'a> Fn(&'a dyn Any) -> Result<&'a dyn Any, EncodeError>,
{
    f
}

/// One mapped field of a backing type.
///
/// The accessors are bound to a concrete field at registration time and
/// erased so the engine can drive them without knowing the backing type.
/// The optional converter is applied to the in-memory value before
/// encoding and reapplied, inverted, after decoding.
#[derive(Clone)]
pub struct FieldModel {
    wire_name: String,
    shape: FieldShape,
    converter: Option<Arc<dyn ValueConverter>>,
    get: Getter,
    set: Setter,
}

impl FieldModel {
    pub(crate) fn new<T, V>(
        wire_name: String,
        shape: FieldShape,
        converter: Option<Arc<dyn ValueConverter>>,
        get: impl Fn(&T) -> &V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self
    where
        T: Any,
        V: Any,
    {
        let get: Getter = Arc::new(getter_fn(move |entity: &dyn Any| {
            let entity = entity
                .downcast_ref::<T>()
                .ok_or(EncodeError::ValueTypeMismatch {
                    expected: type_name::<T>(),
                    context: "field getter",
                })?;
            Ok(get(entity) as &dyn Any)
        }));
        let set: Setter = Arc::new(move |entity: &mut dyn Any, value: Box<dyn Any>| {
            let entity = entity
                .downcast_mut::<T>()
                .ok_or(DecodeError::ValueTypeMismatch {
                    expected: type_name::<T>(),
                    context: "field setter",
                })?;
            let value = value
                .downcast::<V>()
                .map_err(|_| DecodeError::ValueTypeMismatch {
                    expected: type_name::<V>(),
                    context: "field value",
                })?;
            set(entity, *value);
            Ok(())
        });
        Self {
            wire_name,
            shape,
            converter,
            get,
            set,
        }
    }

    /// The convention-derived name this field carries on the wire.
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// The field's value shape.
    pub fn shape(&self) -> &FieldShape {
        &self.shape
    }

    pub(crate) fn converter(&self) -> Option<&Arc<dyn ValueConverter>> {
        self.converter.as_ref()
    }

    /// Borrows the field's value off an entity.
    pub(crate) fn get<'a>(&self, entity: &'a dyn Any) -> Result<&'a dyn Any, EncodeError> {
        (self.get)(entity)
    }

    /// Writes a decoded value into an entity.
    pub(crate) fn set(&self, entity: &mut dyn Any, value: Box<dyn Any>) -> Result<(), DecodeError> {
        (self.set)(entity, value)
    }

    /// Returns a copy of this field with a substituted shape, used by
    /// model specialization.
    pub(crate) fn with_shape(&self, shape: FieldShape) -> FieldModel {
        FieldModel {
            wire_name: self.wire_name.clone(),
            shape,
            converter: self.converter.clone(),
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl fmt::Debug for FieldModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldModel")
            .field("wire_name", &self.wire_name)
            .field("shape", &self.shape)
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::shape::FieldShape;

    #[derive(Debug, Default, PartialEq)]
    struct Probe {
        label: String,
    }

    fn label_field() -> FieldModel {
        FieldModel::new(
            "label".to_string(),
            FieldShape::leaf::<String>(),
            None,
            |p: &Probe| &p.label,
            |p: &mut Probe, v: String| p.label = v,
        )
    }

    #[test]
    fn test_accessor_roundtrip() {
        let field = label_field();
        let mut probe = Probe::default();

        field
            .set(&mut probe, Box::new("hello".to_string()))
            .unwrap();
        assert_eq!(probe.label, "hello");

        let value = field.get(&probe).unwrap();
        assert_eq!(value.downcast_ref::<String>(), Some(&"hello".to_string()));
    }

    #[test]
    fn test_wrong_entity_type() {
        let field = label_field();
        let other = 42i64;
        assert!(matches!(
            field.get(&other),
            Err(EncodeError::ValueTypeMismatch { .. })
        ));

        let mut other = 42i64;
        assert!(matches!(
            field.set(&mut other, Box::new("x".to_string())),
            Err(DecodeError::ValueTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_wrong_value_type() {
        let field = label_field();
        let mut probe = Probe::default();
        assert!(matches!(
            field.set(&mut probe, Box::new(7i32)),
            Err(DecodeError::ValueTypeMismatch { .. })
        ));
    }
}
