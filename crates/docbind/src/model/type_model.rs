//! Type models: the ordered field description of one backing type.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::convention::{Convention, ValueConverter};
use crate::error::MappingError;
use crate::model::field::FieldModel;
use crate::model::key::TypeKey;
use crate::model::shape::FieldShape;

/// The mapped-field description of one backing type.
///
/// Field insertion order is wire encoding order. Models are built once, at
/// the first resolution of a type, and immutable afterward.
#[derive(Debug, Clone)]
pub struct TypeModel {
    key: TypeKey,
    fields: Vec<FieldModel>,
    index: FxHashMap<String, usize>,
    type_args: Vec<TypeKey>,
}

impl TypeModel {
    pub(crate) fn new(
        key: TypeKey,
        fields: Vec<FieldModel>,
        type_args: Vec<TypeKey>,
    ) -> Result<Self, MappingError> {
        let mut index = FxHashMap::default();
        for (position, field) in fields.iter().enumerate() {
            let previous = index.insert(field.wire_name().to_string(), position);
            if previous.is_some() {
                return Err(MappingError::DuplicateField {
                    type_name: key.name(),
                    field: field.wire_name().to_string(),
                });
            }
        }
        Ok(Self {
            key,
            fields,
            index,
            type_args,
        })
    }

    /// Identity of the backing type.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Mapped fields in wire order.
    pub fn fields(&self) -> &[FieldModel] {
        &self.fields
    }

    /// Looks up a field by its wire name.
    pub fn field(&self, wire_name: &str) -> Option<&FieldModel> {
        self.index.get(wire_name).map(|&position| &self.fields[position])
    }

    /// Concrete type arguments bound to the backing type's parameters.
    pub fn type_args(&self) -> &[TypeKey] {
        &self.type_args
    }

    /// Returns true if any field shape still contains an unbound
    /// type parameter.
    pub(crate) fn has_parameters(&self) -> bool {
        self.fields.iter().any(|f| f.shape().has_parameter())
    }

    /// Derives a new model with the given type arguments substituted for
    /// every parameter placeholder.
    ///
    /// The substitution is type-argument-specific, so the result is a new
    /// instance cached independently per instantiation; this model is not
    /// mutated.
    pub fn specialize(&self, args: &[TypeKey]) -> Result<TypeModel, MappingError> {
        let fields = self
            .fields
            .iter()
            .map(|field| Ok(field.with_shape(field.shape().substitute(args)?)))
            .collect::<Result<Vec<_>, MappingError>>()?;
        TypeModel::new(self.key, fields, args.to_vec())
    }
}

/// Collects the field list for one backing type during registration.
///
/// Wire names are derived from the in-memory field identifiers through the
/// registry's conventions; converters come from the conventions unless set
/// explicitly. Shape violations (such as a non-String map key) are
/// recorded here and surfaced when the model is finalized, before any
/// engine exists.
pub struct ModelBuilder<'c, T> {
    key: TypeKey,
    convention: &'c dyn Convention,
    fields: Vec<FieldModel>,
    error: Option<MappingError>,
    _backing: PhantomData<fn(T)>,
}

impl<'c, T: Any> ModelBuilder<'c, T> {
    pub(crate) fn new(key: TypeKey, convention: &'c dyn Convention) -> Self {
        Self {
            key,
            convention,
            fields: Vec::new(),
            error: None,
            _backing: PhantomData,
        }
    }

    /// Maps one field: in-memory identifier, value shape, and accessors.
    pub fn field<V: Any>(
        &mut self,
        name: &str,
        shape: FieldShape,
        get: impl Fn(&T) -> &V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> &mut Self {
        let converter = self.convention.converter(self.key.name(), name);
        self.push_field(name, shape, converter, get, set)
    }

    /// Maps one field with an explicit value converter, overriding any
    /// the conventions would supply.
    pub fn field_with_converter<V: Any>(
        &mut self,
        name: &str,
        shape: FieldShape,
        converter: Arc<dyn ValueConverter>,
        get: impl Fn(&T) -> &V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> &mut Self {
        self.push_field(name, shape, Some(converter), get, set)
    }

    fn push_field<V: Any>(
        &mut self,
        name: &str,
        shape: FieldShape,
        converter: Option<Arc<dyn ValueConverter>>,
        get: impl Fn(&T) -> &V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> &mut Self {
        if self.error.is_none() {
            if let Err(error) = shape.validate(name) {
                self.error = Some(error);
                return self;
            }
            let wire_name = self.convention.wire_name(name);
            self.fields
                .push(FieldModel::new(wire_name, shape, converter, get, set));
        }
        self
    }

    pub(crate) fn build(self) -> Result<TypeModel, MappingError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        TypeModel::new(self.key, self.fields, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convention::CamelCaseConventions;

    #[derive(Debug, Default)]
    struct Tagged<T> {
        value: T,
        note: String,
    }

    fn parametric_model<T: Any + Send>() -> TypeModel {
        let conventions = CamelCaseConventions;
        let mut builder =
            ModelBuilder::<Tagged<T>>::new(TypeKey::of::<Tagged<T>>("test.Tagged"), &conventions);
        builder
            .field(
                "value",
                FieldShape::parameter(0),
                |t: &Tagged<T>| &t.value,
                |t: &mut Tagged<T>, v: T| t.value = v,
            )
            .field(
                "note",
                FieldShape::leaf::<String>(),
                |t: &Tagged<T>| &t.note,
                |t: &mut Tagged<T>, v: String| t.note = v,
            );
        builder.build().unwrap()
    }

    #[test]
    fn test_field_order_and_lookup() {
        let model = parametric_model::<i64>();
        let names: Vec<_> = model.fields().iter().map(|f| f.wire_name()).collect();
        assert_eq!(names, vec!["value", "note"]);
        assert!(model.field("note").is_some());
        assert!(model.field("missing").is_none());
    }

    #[test]
    fn test_specialize_is_a_new_model() {
        let model = parametric_model::<i64>();
        assert!(model.has_parameters());
        assert!(model.type_args().is_empty());

        let bound = model.specialize(&[TypeKey::of::<i64>("i64")]).unwrap();
        assert!(!bound.has_parameters());
        assert_eq!(bound.type_args().len(), 1);

        // The source model keeps its placeholder.
        assert!(model.has_parameters());
    }

    #[test]
    fn test_specialize_out_of_range() {
        let model = parametric_model::<i64>();
        assert!(matches!(
            model.specialize(&[]),
            Err(MappingError::ParameterOutOfRange { .. })
        ));
    }

    #[test]
    fn test_duplicate_wire_name_rejected() {
        #[derive(Debug, Default)]
        struct Pair {
            a: i32,
            b: i32,
        }

        let conventions = CamelCaseConventions;
        let mut builder =
            ModelBuilder::<Pair>::new(TypeKey::of::<Pair>("test.Pair"), &conventions);
        builder
            .field(
                "same",
                FieldShape::leaf::<i32>(),
                |p: &Pair| &p.a,
                |p: &mut Pair, v: i32| p.a = v,
            )
            .field(
                "same",
                FieldShape::leaf::<i32>(),
                |p: &Pair| &p.b,
                |p: &mut Pair, v: i32| p.b = v,
            );
        assert!(matches!(
            builder.build(),
            Err(MappingError::DuplicateField { .. })
        ));
    }

    #[test]
    fn test_invalid_shape_surfaces_at_build() {
        #[derive(Debug, Default)]
        struct Holder {
            lookup: std::collections::HashMap<i32, String>,
        }

        let conventions = CamelCaseConventions;
        let mut builder =
            ModelBuilder::<Holder>::new(TypeKey::of::<Holder>("test.Holder"), &conventions);
        builder.field(
            "lookup",
            FieldShape::map_of::<i32, String>(FieldShape::leaf::<String>()),
            |h: &Holder| &h.lookup,
            |h: &mut Holder, v| h.lookup = v,
        );
        assert!(matches!(
            builder.build(),
            Err(MappingError::MapKeyNotString { .. })
        ));
    }
}
