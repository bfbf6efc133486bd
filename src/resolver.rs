//! The type registry: native types <-> stable type ids <-> wire names.
//!
//! The resolver owns one [`ClassInfo`] record per native type and keeps four
//! views over them in agreement:
//!
//! - a forward map keyed by [`NativeType`] (what governs a value),
//! - a reverse map keyed by full 32-bit type id (numeric registrations),
//! - a composite-hash cache keyed by `(namespace-hash, name-hash)` for the
//!   namespaced read path,
//! - a qualified-name map used by registration checks and cache misses.
//!
//! Registration is write-rare and read-heavy: serialization hits the
//! one-slot inline cache first, then the forward map. All mutation happens
//! on the calling thread; the codec instance is single-threaded by contract.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::buffer::MemoryBuffer;
use crate::builtin::{self, EnumSerializer, StructSerializer};
use crate::config::{CompatibleMode, Config};
use crate::error::{PolycodeError, Result};
use crate::meta::{MetaStringBytes, MetaStringResolver};
use crate::serializer::{Serializer, TypeShape};
use crate::types::{self, Kind, MAX_USER_TYPE_ID};
use crate::value::{NativeType, Value};

/// First auto-assigned user id; lower ids are reserved for built-ins and
/// future wire revisions.
const AUTO_ID_START: u32 = 64;

/// Callback consulted before a type is registered or fabricated. Returning
/// `false` rejects the type with a policy-violation error.
pub type TypeChecker = Box<dyn Fn(&str) -> bool>;

/// Describes a user type being registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    namespace: String,
    type_name: String,
    shape: TypeShape,
}

impl TypeDef {
    fn split(qualified: &str) -> (String, String) {
        match qualified.rfind('.') {
            Some(idx) => (qualified[..idx].to_owned(), qualified[idx + 1..].to_owned()),
            None => (String::new(), qualified.to_owned()),
        }
    }

    /// A struct-shaped type. The last path component of `qualified` is the
    /// type name; the rest is the namespace.
    pub fn structure(qualified: &str) -> Self {
        let (namespace, type_name) = Self::split(qualified);
        Self {
            namespace,
            type_name,
            shape: TypeShape::Struct,
        }
    }

    /// An enum-shaped type.
    pub fn enumeration(qualified: &str) -> Self {
        let (namespace, type_name) = Self::split(qualified);
        Self {
            namespace,
            type_name,
            shape: TypeShape::Enum,
        }
    }

    /// An extension type; serialization requires a registered serializer.
    pub fn extension(qualified: &str) -> Self {
        let (namespace, type_name) = Self::split(qualified);
        Self {
            namespace,
            type_name,
            shape: TypeShape::Ext,
        }
    }

    /// A struct-shaped type from explicit namespace and name parts. The
    /// parts are taken verbatim; `register_by_name` rejects names that
    /// contain the separator.
    pub fn structure_in(namespace: &str, type_name: &str) -> Self {
        Self {
            namespace: namespace.to_owned(),
            type_name: type_name.to_owned(),
            shape: TypeShape::Struct,
        }
    }

    /// An enum-shaped type from explicit namespace and name parts.
    pub fn enumeration_in(namespace: &str, type_name: &str) -> Self {
        Self {
            namespace: namespace.to_owned(),
            type_name: type_name.to_owned(),
            shape: TypeShape::Enum,
        }
    }

    /// The namespace component (possibly empty).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The short type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Namespace and name joined by the separator.
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.namespace, &self.type_name)
    }
}

fn qualified_name(namespace: &str, type_name: &str) -> String {
    if namespace.is_empty() {
        type_name.to_owned()
    } else {
        format!("{namespace}.{type_name}")
    }
}

/// Per-type registration record.
///
/// Invariant: exactly one record per native type; for namespaced kinds both
/// name handles are present and their decoded concatenation is the
/// fully-qualified name.
pub struct ClassInfo {
    native: NativeType,
    kind: Kind,
    type_id: u32,
    full_name: Option<Arc<MetaStringBytes>>,
    namespace: Option<Arc<MetaStringBytes>>,
    type_name: Option<Arc<MetaStringBytes>>,
    ref_array: bool,
    serializer: Option<Arc<dyn Serializer>>,
}

impl std::fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassInfo")
            .field("native", &self.native)
            .field("kind", &self.kind)
            .field("type_id", &self.type_id)
            .field("has_serializer", &self.serializer.is_some())
            .finish()
    }
}

impl ClassInfo {
    /// The governing native type.
    pub fn native(&self) -> &NativeType {
        &self.native
    }

    /// The internal kind (low 8 bits of the type id).
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The full 32-bit type id written on the wire.
    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    /// True when the record describes an array of references.
    pub fn is_ref_array(&self) -> bool {
        self.ref_array
    }

    /// Encoded namespace handle (namespaced kinds only).
    pub fn namespace_bytes(&self) -> Option<&Arc<MetaStringBytes>> {
        self.namespace.as_ref()
    }

    /// Encoded short-name handle (namespaced kinds only).
    pub fn type_name_bytes(&self) -> Option<&Arc<MetaStringBytes>> {
        self.type_name.as_ref()
    }

    /// Encoded fully-qualified-name handle (user types only).
    pub fn full_name_bytes(&self) -> Option<&Arc<MetaStringBytes>> {
        self.full_name.as_ref()
    }

    /// The serializer for this type.
    ///
    /// # Errors
    /// [`PolycodeError::UnregisteredSerializer`] when none is attached
    /// (extension types before `register_serializer`).
    pub fn serializer(&self) -> Result<Arc<dyn Serializer>> {
        self.serializer.clone().ok_or_else(|| {
            PolycodeError::UnregisteredSerializer(format!("{:?}", self.native))
        })
    }
}

/// Registry mapping native types, type ids and wire names to serializers.
pub struct TypeResolver {
    compatible: bool,
    /// Forward map: one record per native type.
    class_info_map: HashMap<NativeType, Arc<ClassInfo>>,
    /// Reverse map for numeric registrations, keyed by full type id.
    type_id_map: HashMap<u32, Arc<ClassInfo>>,
    /// Read-path cache keyed by `(namespace-hash, name-hash)`.
    name_hash_map: HashMap<(u64, u64), Arc<ClassInfo>>,
    /// Registration checks and composite-cache misses, keyed by name.
    qualified_map: HashMap<String, Arc<ClassInfo>>,
    /// User ids consumed by explicit or auto registration.
    used_user_ids: HashSet<u32>,
    next_user_id: u32,
    /// One-slot inline cache for the hot write path.
    inline_cache: Option<(NativeType, Arc<ClassInfo>)>,
    type_checker: Option<TypeChecker>,
}

impl std::fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeResolver")
            .field("registered", &self.class_info_map.len())
            .field("next_user_id", &self.next_user_id)
            .finish()
    }
}

impl TypeResolver {
    /// Creates a resolver with all built-in kinds registered.
    pub fn new(config: &Config) -> Self {
        let mut resolver = Self {
            compatible: config.compatible_mode == CompatibleMode::Compatible,
            class_info_map: HashMap::new(),
            type_id_map: HashMap::new(),
            name_hash_map: HashMap::new(),
            qualified_map: HashMap::new(),
            used_user_ids: HashSet::new(),
            next_user_id: AUTO_ID_START,
            inline_cache: None,
            type_checker: None,
        };
        resolver.register_default_types();
        resolver
    }

    fn register_default_types(&mut self) {
        for (native, kind, serializer) in builtin::default_registrations() {
            let info = Arc::new(ClassInfo {
                native: native.clone(),
                kind,
                type_id: kind as u32,
                full_name: None,
                namespace: None,
                type_name: None,
                ref_array: kind == Kind::Array,
                serializer: Some(serializer),
            });
            self.class_info_map.insert(native, info.clone());
            self.type_id_map.insert(kind as u32, info);
        }
    }

    /// Installs a security checker consulted at registration and at
    /// placeholder fabrication.
    pub fn set_type_checker(&mut self, checker: TypeChecker) {
        self.type_checker = Some(checker);
    }

    fn check_policy(&self, qualified: &str) -> Result<()> {
        if let Some(checker) = &self.type_checker {
            if !checker(qualified) {
                return Err(PolycodeError::PolicyViolation(format!(
                    "Type {qualified} rejected by the type checker"
                )));
            }
        }
        Ok(())
    }

    // --- REGISTRATION ---

    /// Registers a user type with an auto-assigned id (starting at 64,
    /// skipping ids already in use). Returns the assigned id.
    pub fn register(&mut self, meta: &mut MetaStringResolver, ty: &TypeDef) -> Result<u32> {
        while self.used_user_ids.contains(&self.next_user_id) {
            self.next_user_id += 1;
        }
        let id = self.next_user_id;
        self.register_with_id(meta, ty, id)?;
        self.next_user_id += 1;
        Ok(id)
    }

    /// Registers a user type under an explicit id (< 4096).
    pub fn register_with_id(
        &mut self,
        meta: &mut MetaStringResolver,
        ty: &TypeDef,
        user_id: u32,
    ) -> Result<()> {
        if user_id >= MAX_USER_TYPE_ID {
            return Err(PolycodeError::IdOverflow(format!(
                "Type id {user_id} is not below the bound {MAX_USER_TYPE_ID}"
            )));
        }
        let qualified = ty.qualified_name();
        self.check_policy(&qualified)?;
        if let Some(existing) = self.qualified_map.get(&qualified) {
            return Err(PolycodeError::IdReused(format!(
                "Type {qualified} is already registered with type id {}",
                existing.type_id
            )));
        }
        if self.used_user_ids.contains(&user_id) {
            return Err(PolycodeError::IdReused(format!(
                "Type id {user_id} is already taken"
            )));
        }

        let kind = self.numeric_kind(ty.shape);
        let type_id = types::make_type_id(user_id, kind);
        let info = self.build_user_class_info(meta, ty, kind, type_id)?;

        self.used_user_ids.insert(user_id);
        self.type_id_map.insert(type_id, info.clone());
        self.insert_named(&qualified, info);
        debug!(%qualified, type_id, "registered type by id");
        Ok(())
    }

    /// Registers a user type by `(namespace, name)`. Namespaced
    /// registrations do not consume a numeric id.
    pub fn register_by_name(&mut self, meta: &mut MetaStringResolver, ty: &TypeDef) -> Result<()> {
        if ty.type_name.contains('.') {
            return Err(PolycodeError::InvalidTypeName(format!(
                "Type name {} must not contain `.`; put the path into the namespace",
                ty.type_name
            )));
        }
        let qualified = ty.qualified_name();
        self.check_policy(&qualified)?;
        if let Some(existing) = self.qualified_map.get(&qualified) {
            // Re-registering the identical type is a no-op; anything else
            // conflicts on the wire name.
            if existing.kind.is_namespaced() && shape_of_kind(existing.kind) == ty.shape {
                return Ok(());
            }
            return Err(PolycodeError::NameConflict(format!(
                "Name {qualified} is already associated with kind {:?}",
                existing.kind
            )));
        }

        let kind = self.namespaced_kind(ty.shape);
        let info = self.build_user_class_info(meta, ty, kind, kind as u32)?;

        let ns = info.namespace.clone();
        let name = info.type_name.clone();
        if let (Some(ns), Some(name)) = (ns, name) {
            self.name_hash_map
                .insert((ns.hash(), name.hash()), info.clone());
        }
        self.insert_named(&qualified, info);
        debug!(%qualified, "registered type by name");
        Ok(())
    }

    /// Overrides the serializer of a previously registered type. The kind
    /// chosen at registration is kept.
    pub fn register_serializer(
        &mut self,
        qualified: &str,
        serializer: Arc<dyn Serializer>,
    ) -> Result<()> {
        let existing = self.qualified_map.get(qualified).cloned().ok_or_else(|| {
            PolycodeError::UnregisteredType(format!(
                "Type {qualified} must be registered before a serializer"
            ))
        })?;
        let rebuilt = Arc::new(ClassInfo {
            native: existing.native.clone(),
            kind: existing.kind,
            type_id: existing.type_id,
            full_name: existing.full_name.clone(),
            namespace: existing.namespace.clone(),
            type_name: existing.type_name.clone(),
            ref_array: existing.ref_array,
            serializer: Some(serializer),
        });
        if existing.kind.is_namespaced() {
            if let (Some(ns), Some(name)) = (&rebuilt.namespace, &rebuilt.type_name) {
                self.name_hash_map
                    .insert((ns.hash(), name.hash()), rebuilt.clone());
            }
        } else {
            self.type_id_map.insert(rebuilt.type_id, rebuilt.clone());
        }
        self.insert_named(qualified, rebuilt);
        Ok(())
    }

    fn insert_named(&mut self, qualified: &str, info: Arc<ClassInfo>) {
        self.qualified_map.insert(qualified.to_owned(), info.clone());
        self.class_info_map
            .insert(NativeType::Named(Arc::from(qualified)), info);
        self.inline_cache = None;
    }

    fn numeric_kind(&self, shape: TypeShape) -> Kind {
        match shape {
            TypeShape::Enum => Kind::Enum,
            TypeShape::Ext => Kind::Ext,
            TypeShape::Struct => {
                if self.compatible {
                    Kind::CompatibleStruct
                } else {
                    Kind::Struct
                }
            }
        }
    }

    fn namespaced_kind(&self, shape: TypeShape) -> Kind {
        match shape {
            TypeShape::Enum => Kind::NsEnum,
            TypeShape::Ext => Kind::NsExt,
            TypeShape::Struct => {
                if self.compatible {
                    Kind::NsCompatibleStruct
                } else {
                    Kind::NsStruct
                }
            }
        }
    }

    fn build_user_class_info(
        &mut self,
        meta: &mut MetaStringResolver,
        ty: &TypeDef,
        kind: Kind,
        type_id: u32,
    ) -> Result<Arc<ClassInfo>> {
        let qualified = ty.qualified_name();
        let full_name = meta.intern_str(&qualified)?;
        let namespace = meta.intern_str(&ty.namespace)?;
        let type_name = meta.intern_str(&ty.type_name)?;
        let name: Arc<str> = Arc::from(qualified.as_str());

        let serializer: Option<Arc<dyn Serializer>> = match ty.shape {
            TypeShape::Struct => Some(Arc::new(StructSerializer::new(
                name.clone(),
                Some(full_name.hash() as u32),
            ))),
            TypeShape::Enum => Some(Arc::new(EnumSerializer::new(name.clone()))),
            // Ext payloads are opaque; serialization fails until the user
            // attaches a serializer.
            TypeShape::Ext => None,
        };

        Ok(Arc::new(ClassInfo {
            native: NativeType::Named(name),
            kind,
            type_id,
            full_name: Some(full_name),
            namespace: Some(namespace),
            type_name: Some(type_name),
            ref_array: false,
            serializer,
        }))
    }

    // --- WRITE PATH ---

    /// Resolves the record governing `value` through the one-slot inline
    /// cache.
    ///
    /// # Errors
    /// [`PolycodeError::UnregisteredType`] for an unregistered user type.
    pub fn get_class_info(&mut self, value: &Value) -> Result<Arc<ClassInfo>> {
        let native = value.native_type().ok_or_else(|| {
            PolycodeError::Internal("Null values are handled by the reference protocol".into())
        })?;
        if let Some((cached_native, cached)) = &self.inline_cache {
            if *cached_native == native {
                return Ok(cached.clone());
            }
        }
        let info = self.class_info_map.get(&native).cloned();
        match info {
            Some(info) => {
                self.inline_cache = Some((native, info.clone()));
                Ok(info)
            }
            None => Err(unregistered_error(&native)),
        }
    }

    /// Cache-free resolution for read-only frames (deep copy).
    pub fn lookup_class_info(&self, value: &Value) -> Result<Arc<ClassInfo>> {
        let native = value.native_type().ok_or_else(|| {
            PolycodeError::Internal("Null values are handled by the reference protocol".into())
        })?;
        self.class_info_map
            .get(&native)
            .cloned()
            .ok_or_else(|| unregistered_error(&native))
    }

    /// Emits type metadata: the full type id as VarUint, plus the namespace
    /// and type-name meta-strings for namespaced kinds.
    pub fn write_class_info(
        &mut self,
        buffer: &mut MemoryBuffer,
        meta: &mut MetaStringResolver,
        info: &Arc<ClassInfo>,
    ) {
        buffer.write_var_uint32(info.type_id);
        if info.kind.is_namespaced() {
            if let (Some(ns), Some(name)) = (&info.namespace, &info.type_name) {
                meta.write_meta_string_bytes(buffer, ns);
                meta.write_meta_string_bytes(buffer, name);
            }
        }
    }

    // --- READ PATH ---

    /// Reads type metadata and resolves the registered record.
    ///
    /// Namespaced kinds go through the composite-hash cache; on a miss the
    /// decoded qualified name is looked up, and unknown names either
    /// fabricate a placeholder (when permitted) or fail.
    pub fn read_class_info(
        &mut self,
        buffer: &mut MemoryBuffer,
        meta: &mut MetaStringResolver,
        config: &Config,
    ) -> Result<Arc<ClassInfo>> {
        let type_id = buffer.read_var_uint32_small7()?;
        let kind = types::kind_of(type_id)?;
        if !kind.is_namespaced() {
            return self.type_id_map.get(&type_id).cloned().ok_or_else(|| {
                PolycodeError::UnregisteredType(format!("No registration for type id {type_id}"))
            });
        }

        let ns = meta.read_meta_string_bytes(buffer)?;
        let name = meta.read_meta_string_bytes(buffer)?;
        let key = (ns.hash(), name.hash());
        if let Some(info) = self.name_hash_map.get(&key) {
            return Ok(info.clone());
        }
        let info = self.populate_name_cache(kind, &ns, &name, config)?;
        self.name_hash_map.insert(key, info.clone());
        Ok(info)
    }

    fn populate_name_cache(
        &mut self,
        kind: Kind,
        ns: &Arc<MetaStringBytes>,
        name: &Arc<MetaStringBytes>,
        config: &Config,
    ) -> Result<Arc<ClassInfo>> {
        let namespace = ns.decode()?;
        let type_name = name.decode()?;
        let qualified = qualified_name(&namespace, &type_name);
        if let Some(info) = self.qualified_map.get(&qualified) {
            return Ok(info.clone());
        }

        // Unknown name: fabricate a placeholder when the configuration
        // permits, otherwise fail resolution.
        let fabrication_allowed =
            config.deserialize_unexistent_class || !config.require_class_registration;
        if !fabrication_allowed {
            return Err(PolycodeError::UnregisteredType(qualified));
        }
        if kind.is_ext() {
            // Ext payloads are opaque; there is nothing safe to skip.
            return Err(PolycodeError::UnregisteredSerializer(qualified));
        }
        self.check_policy(&qualified)?;
        warn!(%qualified, "type not registered, fabricating a placeholder");

        let named: Arc<str> = Arc::from(qualified.as_str());
        let serializer: Arc<dyn Serializer> = if kind.is_enum() {
            Arc::new(EnumSerializer::new(named.clone()))
        } else {
            // Placeholder structs read their payload generically and keep
            // the fields; no version expectation is attached.
            Arc::new(StructSerializer::new(named.clone(), None))
        };
        Ok(Arc::new(ClassInfo {
            native: NativeType::Named(named),
            kind,
            type_id: kind as u32,
            full_name: None,
            namespace: Some(ns.clone()),
            type_name: Some(name.clone()),
            ref_array: false,
            serializer: Some(serializer),
        }))
    }
}

fn unregistered_error(native: &NativeType) -> PolycodeError {
    match native {
        NativeType::Named(name) => {
            PolycodeError::UnregisteredType(format!("Type {name} is not registered"))
        }
        other => PolycodeError::Internal(format!("Built-in registration missing for {other:?}")),
    }
}

fn shape_of_kind(kind: Kind) -> TypeShape {
    if kind.is_enum() {
        TypeShape::Enum
    } else if kind.is_ext() {
        TypeShape::Ext
    } else {
        TypeShape::Struct
    }
}
