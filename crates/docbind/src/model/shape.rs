//! Field shape tree: the recursive description of one field's value.
//!
//! A shape is built once, when a type is registered, and reused for every
//! encode/decode call. Containers wrap their element shape recursively, so
//! a sequence of sequences of maps composes without limit. Leaves defer to
//! a codec looked up by type at call time, which is what lets a field
//! declared as one type hold and round-trip another.

use std::any::{Any, TypeId, type_name};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::error::{DecodeError, EncodeError, MappingError};
use crate::model::key::TypeKey;

/// Monomorphized operations over one concrete sequence or set type.
///
/// The shape tree is type-erased; these fn pointers carry the only
/// type-specific code a container level needs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SeqOps {
    pub(crate) new: fn() -> Box<dyn Any>,
    pub(crate) push: fn(&mut dyn Any, Box<dyn Any>) -> Result<(), DecodeError>,
    pub(crate) iter: for<'a> fn(&'a dyn Any) -> Result<Vec<&'a dyn Any>, EncodeError>,
}

/// Monomorphized operations over one concrete keyed-map type.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MapOps {
    pub(crate) new: fn() -> Box<dyn Any>,
    pub(crate) insert: fn(&mut dyn Any, String, Box<dyn Any>) -> Result<(), DecodeError>,
    pub(crate) entries: for<'a> fn(&'a dyn Any) -> Result<Vec<(&'a str, &'a dyn Any)>, EncodeError>,
}

#[derive(Debug, Clone)]
pub(crate) enum ShapeNode {
    /// Scalar or nested registered type; codec looked up by declared type
    /// on decode and by the value's runtime type on encode.
    Leaf {
        id: TypeId,
        type_name: &'static str,
    },
    /// `Box<dyn Entity>` field; the concrete codec is resolved through the
    /// wire discriminator on decode and the inner runtime type on encode.
    Polymorphic,
    Sequence {
        elem: Box<FieldShape>,
        ops: SeqOps,
    },
    Map {
        key_id: TypeId,
        key_type: &'static str,
        value: Box<FieldShape>,
        ops: MapOps,
    },
    /// Placeholder for the backing type's n-th type parameter; only valid
    /// until specialization substitutes it.
    Parameter(usize),
}

/// Recursive description of how one field's value is encoded and decoded.
#[derive(Debug, Clone)]
pub struct FieldShape {
    pub(crate) node: ShapeNode,
}

impl FieldShape {
    /// A leaf resolved by type: one of the built-in scalars, or any type
    /// registered with the codec registry.
    pub fn leaf<V: Any>() -> FieldShape {
        FieldShape {
            node: ShapeNode::Leaf {
                id: TypeId::of::<V>(),
                type_name: type_name::<V>(),
            },
        }
    }

    /// A `Box<dyn Entity>` field holding any registered concrete type.
    pub fn polymorphic() -> FieldShape {
        FieldShape {
            node: ShapeNode::Polymorphic,
        }
    }

    /// A `Vec<E>` field; decodes in document order.
    pub fn sequence_of<E: Any>(elem: FieldShape) -> FieldShape {
        FieldShape {
            node: ShapeNode::Sequence {
                elem: Box::new(elem),
                ops: SeqOps {
                    new: vec_new::<E>,
                    push: vec_push::<E>,
                    iter: vec_iter::<E>,
                },
            },
        }
    }

    /// A `HashSet<E>` field; encoded as an array region.
    pub fn set_of<E: Any + Eq + Hash>(elem: FieldShape) -> FieldShape {
        FieldShape {
            node: ShapeNode::Sequence {
                elem: Box::new(elem),
                ops: SeqOps {
                    new: set_new::<E>,
                    push: set_insert::<E>,
                    iter: set_iter::<E>,
                },
            },
        }
    }

    /// A `HashMap<K, V>` field.
    ///
    /// Keys become document field names, so `K` must be `String`; any
    /// other key type is rejected when the field is added to a model,
    /// before any document is ever processed.
    pub fn map_of<K: Any + Eq + Hash, V: Any>(value: FieldShape) -> FieldShape {
        FieldShape {
            node: ShapeNode::Map {
                key_id: TypeId::of::<K>(),
                key_type: type_name::<K>(),
                value: Box::new(value),
                ops: MapOps {
                    new: map_new::<K, V>,
                    insert: map_insert::<K, V>,
                    entries: map_entries::<K, V>,
                },
            },
        }
    }

    /// Placeholder for the backing type's `index`-th type parameter.
    pub fn parameter(index: usize) -> FieldShape {
        FieldShape {
            node: ShapeNode::Parameter(index),
        }
    }

    /// Validates structural invariants, failing fast at model-build time.
    pub(crate) fn validate(&self, field: &str) -> Result<(), MappingError> {
        match &self.node {
            ShapeNode::Leaf { .. } | ShapeNode::Polymorphic | ShapeNode::Parameter(_) => Ok(()),
            ShapeNode::Sequence { elem, .. } => elem.validate(field),
            ShapeNode::Map {
                key_id,
                key_type,
                value,
                ..
            } => {
                if *key_id != TypeId::of::<String>() {
                    return Err(MappingError::MapKeyNotString {
                        field: field.to_string(),
                        key_type,
                    });
                }
                value.validate(field)
            }
        }
    }

    /// Returns true if any node in the tree is an unbound parameter.
    pub(crate) fn has_parameter(&self) -> bool {
        match &self.node {
            ShapeNode::Parameter(_) => true,
            ShapeNode::Leaf { .. } | ShapeNode::Polymorphic => false,
            ShapeNode::Sequence { elem, .. } => elem.has_parameter(),
            ShapeNode::Map { value, .. } => value.has_parameter(),
        }
    }

    /// Returns a copy with every parameter replaced by a leaf of the
    /// corresponding bound type argument.
    pub(crate) fn substitute(&self, args: &[TypeKey]) -> Result<FieldShape, MappingError> {
        let node = match &self.node {
            ShapeNode::Parameter(index) => {
                let key = args
                    .get(*index)
                    .ok_or(MappingError::ParameterOutOfRange {
                        index: *index,
                        available: args.len(),
                    })?;
                ShapeNode::Leaf {
                    id: key.id(),
                    type_name: key.name(),
                }
            }
            ShapeNode::Sequence { elem, ops } => ShapeNode::Sequence {
                elem: Box::new(elem.substitute(args)?),
                ops: *ops,
            },
            ShapeNode::Map {
                key_id,
                key_type,
                value,
                ops,
            } => ShapeNode::Map {
                key_id: *key_id,
                key_type,
                value: Box::new(value.substitute(args)?),
                ops: *ops,
            },
            other => other.clone(),
        };
        Ok(FieldShape { node })
    }
}

// =============================================================================
// CONTAINER OPS
// =============================================================================

fn container_mismatch<C>(context: &'static str) -> DecodeError {
    DecodeError::ValueTypeMismatch {
        expected: type_name::<C>(),
        context,
    }
}

fn vec_new<E: Any>() -> Box<dyn Any> {
    Box::new(Vec::<E>::new())
}

fn vec_push<E: Any>(container: &mut dyn Any, value: Box<dyn Any>) -> Result<(), DecodeError> {
    let vec = container
        .downcast_mut::<Vec<E>>()
        .ok_or_else(|| container_mismatch::<Vec<E>>("sequence container"))?;
    let value = value.downcast::<E>().map_err(|_| DecodeError::ValueTypeMismatch {
        expected: type_name::<E>(),
        context: "sequence element",
    })?;
    vec.push(*value);
    Ok(())
}

fn vec_iter<E: Any>(container: &dyn Any) -> Result<Vec<&dyn Any>, EncodeError> {
    let vec = container
        .downcast_ref::<Vec<E>>()
        .ok_or(EncodeError::ValueTypeMismatch {
            expected: type_name::<Vec<E>>(),
            context: "sequence container",
        })?;
    Ok(vec.iter().map(|e| e as &dyn Any).collect())
}

fn set_new<E: Any + Eq + Hash>() -> Box<dyn Any> {
    Box::new(HashSet::<E>::new())
}

fn set_insert<E: Any + Eq + Hash>(
    container: &mut dyn Any,
    value: Box<dyn Any>,
) -> Result<(), DecodeError> {
    let set = container
        .downcast_mut::<HashSet<E>>()
        .ok_or_else(|| container_mismatch::<HashSet<E>>("set container"))?;
    let value = value.downcast::<E>().map_err(|_| DecodeError::ValueTypeMismatch {
        expected: type_name::<E>(),
        context: "set element",
    })?;
    set.insert(*value);
    Ok(())
}

fn set_iter<E: Any + Eq + Hash>(container: &dyn Any) -> Result<Vec<&dyn Any>, EncodeError> {
    let set = container
        .downcast_ref::<HashSet<E>>()
        .ok_or(EncodeError::ValueTypeMismatch {
            expected: type_name::<HashSet<E>>(),
            context: "set container",
        })?;
    Ok(set.iter().map(|e| e as &dyn Any).collect())
}

fn map_new<K: Any + Eq + Hash, V: Any>() -> Box<dyn Any> {
    Box::new(HashMap::<K, V>::new())
}

fn map_insert<K: Any + Eq + Hash, V: Any>(
    container: &mut dyn Any,
    key: String,
    value: Box<dyn Any>,
) -> Result<(), DecodeError> {
    let map = container
        .downcast_mut::<HashMap<K, V>>()
        .ok_or_else(|| container_mismatch::<HashMap<K, V>>("map container"))?;
    // Key types other than String are rejected at model-build time.
    let key = (Box::new(key) as Box<dyn Any>)
        .downcast::<K>()
        .map_err(|_| DecodeError::ValueTypeMismatch {
            expected: type_name::<K>(),
            context: "map key",
        })?;
    let value = value.downcast::<V>().map_err(|_| DecodeError::ValueTypeMismatch {
        expected: type_name::<V>(),
        context: "map value",
    })?;
    map.insert(*key, *value);
    Ok(())
}

fn map_entries<K: Any + Eq + Hash, V: Any>(
    container: &dyn Any,
) -> Result<Vec<(&str, &dyn Any)>, EncodeError> {
    let map = container
        .downcast_ref::<HashMap<K, V>>()
        .ok_or(EncodeError::ValueTypeMismatch {
            expected: type_name::<HashMap<K, V>>(),
            context: "map container",
        })?;
    map.iter()
        .map(|(key, value)| {
            let key: &dyn Any = key;
            let key = key
                .downcast_ref::<String>()
                .ok_or(EncodeError::ValueTypeMismatch {
                    expected: "String",
                    context: "map key",
                })?;
            Ok((key.as_str(), value as &dyn Any))
        })
        .collect()
}
