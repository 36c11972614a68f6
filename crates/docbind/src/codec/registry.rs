//! Codec registry: registration surface and build-once engine cache.
//!
//! Registration is declarative and cheap; nothing is validated until a
//! type is first resolved. At that point the registry runs the stored
//! field-list builder through the conventions, builds the engine, and
//! caches it for the registry's lifetime, so every later resolution of the
//! same type returns the same engine.

use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::codec::engine::{EntityCodec, scan_discriminator};
use crate::convention::{CamelCaseConventions, Convention};
use crate::doc::{DocReader, DocWriter};
use crate::error::{DecodeError, EncodeError, MappingError};
use crate::model::{Entity, ModelBuilder, TypeKey};

type BuildFn = Box<dyn Fn(&dyn Convention) -> Result<EntityCodec, MappingError> + Send + Sync>;

struct Registration {
    name: &'static str,
    build: BuildFn,
}

// ================================================================
// BUILDER
// ================================================================

/// Collects registrations, then freezes them into a [`CodecRegistry`].
pub struct RegistryBuilder {
    conventions: Arc<dyn Convention>,
    registrations: Vec<(TypeId, Registration)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            conventions: Arc::new(CamelCaseConventions),
            registrations: Vec::new(),
        }
    }

    /// Replaces the default convention pack.
    pub fn conventions(mut self, conventions: Arc<dyn Convention>) -> Self {
        self.conventions = conventions;
        self
    }

    /// Registers a backing type under a wire type name. The closure maps
    /// its fields; it runs once, at the type's first resolution.
    pub fn register<T, F>(self, name: &'static str, fields: F) -> Self
    where
        T: Any + Send + Default,
        F: Fn(&mut ModelBuilder<'_, T>) + Send + Sync + 'static,
    {
        self.register_parametric::<T, F>(name, Vec::new(), fields)
    }

    /// Registers one concrete instantiation of a generic backing type.
    ///
    /// Parameter placeholders in the field shapes are bound to `type_args`
    /// positionally. Each instantiation is its own registration with its
    /// own wire name; the wire format has no generic types.
    pub fn register_parametric<T, F>(
        mut self,
        name: &'static str,
        type_args: Vec<TypeKey>,
        fields: F,
    ) -> Self
    where
        T: Any + Send + Default,
        F: Fn(&mut ModelBuilder<'_, T>) + Send + Sync + 'static,
    {
        let build: BuildFn = Box::new(move |conventions: &dyn Convention| {
            if !conventions.is_mappable(name) {
                return Err(MappingError::NotMappable { type_name: name });
            }
            let mut builder = ModelBuilder::<T>::new(TypeKey::of::<T>(name), conventions);
            fields(&mut builder);
            let mut model = builder.build()?;
            if !type_args.is_empty() {
                model = model.specialize(&type_args)?;
            }
            EntityCodec::new::<T>(model)
        });
        self.registrations
            .push((TypeId::of::<T>(), Registration { name, build }));
        self
    }

    /// Freezes the registrations. Fails on a backing type or wire name
    /// registered twice.
    pub fn build(self) -> Result<CodecRegistry, MappingError> {
        let mut registered = FxHashMap::default();
        let mut by_name = FxHashMap::default();
        for (id, registration) in self.registrations {
            if by_name.insert(registration.name, id).is_some() {
                return Err(MappingError::DuplicateTypeName {
                    name: registration.name,
                });
            }
            let name = registration.name;
            if registered.insert(id, registration).is_some() {
                return Err(MappingError::DuplicateRegistration { type_name: name });
            }
        }
        Ok(CodecRegistry {
            registered,
            by_name,
            conventions: self.conventions,
            engines: RwLock::new(FxHashMap::default()),
        })
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ================================================================
// REGISTRY
// ================================================================

/// The frozen registry: resolves, caches, and shares codec engines.
pub struct CodecRegistry {
    registered: FxHashMap<TypeId, Registration>,
    by_name: FxHashMap<&'static str, TypeId>,
    conventions: Arc<dyn Convention>,
    engines: RwLock<FxHashMap<TypeId, Arc<EntityCodec>>>,
}

impl CodecRegistry {
    /// Starts an empty [`RegistryBuilder`].
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Resolves the engine for a backing type, building and caching it on
    /// first use. `Ok(None)` means the type was never registered; `Err`
    /// means its registration is invalid, reported identically on every
    /// resolution.
    pub fn resolve(&self, id: TypeId) -> Result<Option<Arc<EntityCodec>>, MappingError> {
        if let Some(engine) = self.engines.read().get(&id) {
            return Ok(Some(engine.clone()));
        }
        let Some(registration) = self.registered.get(&id) else {
            return Ok(None);
        };
        let mut engines = self.engines.write();
        // Another thread may have built it between the locks.
        if let Some(engine) = engines.get(&id) {
            return Ok(Some(engine.clone()));
        }
        debug!(type_name = registration.name, "building codec engine");
        let engine = Arc::new((registration.build)(self.conventions.as_ref())?);
        engines.insert(id, engine.clone());
        Ok(Some(engine))
    }

    /// Typed convenience over [`CodecRegistry::resolve`].
    pub fn resolve_for<T: Any>(&self) -> Result<Option<Arc<EntityCodec>>, MappingError> {
        self.resolve(TypeId::of::<T>())
    }

    /// Resolves an engine from a wire type name, as read from a document
    /// discriminator.
    pub fn resolve_by_name(&self, name: &str) -> Result<Arc<EntityCodec>, DecodeError> {
        let id = self
            .by_name
            .get(name)
            .copied()
            .ok_or_else(|| DecodeError::UnknownTypeName {
                name: name.to_string(),
            })?;
        self.resolve(id)?.ok_or_else(|| DecodeError::UnknownTypeName {
            name: name.to_string(),
        })
    }

    /// Encodes a value as a root document body.
    pub fn encode<T: Any>(&self, writer: &mut DocWriter, value: &T) -> Result<(), EncodeError> {
        let engine = self
            .resolve(TypeId::of::<T>())?
            .ok_or(EncodeError::NoCodecForType {
                type_name: type_name::<T>(),
            })?;
        engine.encode_body(writer, value, self)
    }

    /// Encodes an entity behind the trait object, dispatching on its
    /// runtime type.
    pub fn encode_dyn(&self, writer: &mut DocWriter, entity: &dyn Entity) -> Result<(), EncodeError> {
        let inner = entity.as_any();
        let engine = self
            .resolve(inner.type_id())?
            .ok_or(EncodeError::NoCodecForType {
                type_name: "dyn Entity",
            })?;
        engine.encode_body(writer, inner, self)
    }

    /// Decodes a root document body into `T`.
    pub fn decode<T: Any>(&self, reader: &mut DocReader<'_>) -> Result<T, DecodeError> {
        let engine = self
            .resolve(TypeId::of::<T>())?
            .ok_or(DecodeError::NoCodecForType {
                type_name: type_name::<T>(),
            })?;
        let value = engine.decode(reader, self)?;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(DecodeError::ValueTypeMismatch {
                expected: type_name::<T>(),
                context: "top-level decode",
            }),
        }
    }

    /// Decodes a root document body into whatever type its discriminator
    /// names.
    pub fn decode_dyn(&self, reader: &mut DocReader<'_>) -> Result<Box<dyn Entity>, DecodeError> {
        let name = scan_discriminator(reader)?.ok_or(DecodeError::MissingDiscriminator {
            context: "top-level document",
        })?;
        let engine = self.resolve_by_name(&name)?;
        let value = engine.decode_body(reader, self)?;
        (engine.upcast())(value)
    }
}
