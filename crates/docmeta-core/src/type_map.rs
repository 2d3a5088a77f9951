//! Implementation type to public type mapping
//!
//! Declared types are mostly implementation classes. Before a type is
//! shown it is mapped onto the documented vocabulary through a fixed
//! fallback chain; see [`TypeMapper::map_type`]. Only the displayed name
//! ever changes: the binary name and array dimensions of the declaration
//! are always kept.

use crate::model::{EntityModel, TypeEntity, TypeName, short_name_of};
use std::collections::HashMap;
use tracing::trace;

/// The public identity a type maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTarget {
    pub qualified: String,
    pub short: String,
}

impl MappingTarget {
    pub fn new(qualified: impl Into<String>) -> Self {
        let qualified = qualified.into();
        Self {
            short: short_name_of(&qualified).to_string(),
            qualified,
        }
    }

    fn of(ty: &TypeEntity) -> Self {
        Self {
            qualified: ty.qualified_name.clone(),
            short: ty.short_name.clone(),
        }
    }
}

/// Built-in mappings for platform types
const SEEDS: &[(&str, &str)] = &[
    ("java.lang.String", "String"),
    ("java.lang.CharSequence", "String"),
    ("java.lang.Character", "String"),
    ("char", "String"),
    ("java.lang.Number", "Number"),
    ("java.lang.Integer", "Number"),
    ("java.lang.Long", "Number"),
    ("java.lang.Short", "Number"),
    ("java.lang.Byte", "Number"),
    ("java.lang.Float", "Number"),
    ("java.lang.Double", "Number"),
    ("java.math.BigDecimal", "Number"),
    ("java.math.BigInteger", "Number"),
    ("int", "Number"),
    ("long", "Number"),
    ("short", "Number"),
    ("byte", "Number"),
    ("float", "Number"),
    ("double", "Number"),
    ("java.lang.Boolean", "Boolean"),
    ("boolean", "Boolean"),
    ("java.lang.Object", "Object"),
    ("java.util.Date", "Date"),
    ("java.sql.Date", "Date"),
    ("java.sql.Timestamp", "Date"),
];

/// Seeded, run-time extended mapping table
///
/// Seeds survive [`reset`](Self::reset); discovered mappings do not.
#[derive(Debug, Clone)]
pub struct TypeMappingCache {
    seeds: HashMap<String, MappingTarget>,
    discovered: HashMap<String, MappingTarget>,
}

impl Default for TypeMappingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeMappingCache {
    /// A cache seeded with the built-in platform mappings
    pub fn new() -> Self {
        let mut cache = Self::empty();
        for (from, to) in SEEDS {
            cache.seed(from, MappingTarget::new(*to));
        }
        cache
    }

    /// A cache without any seed
    pub fn empty() -> Self {
        Self {
            seeds: HashMap::new(),
            discovered: HashMap::new(),
        }
    }

    pub fn seed(&mut self, from: &str, target: MappingTarget) {
        self.seeds.insert(from.to_string(), target);
    }

    pub fn with_seed(mut self, from: &str, to: &str) -> Self {
        self.seed(from, MappingTarget::new(to));
        self
    }

    pub fn get(&self, qualified: &str) -> Option<&MappingTarget> {
        self.seeds
            .get(qualified)
            .or_else(|| self.discovered.get(qualified))
    }

    pub fn record(&mut self, from: &str, target: MappingTarget) {
        self.discovered.insert(from.to_string(), target);
    }

    pub fn discovered_len(&self) -> usize {
        self.discovered.len()
    }

    /// Drop every discovered mapping
    pub fn reset(&mut self) {
        self.discovered.clear();
    }
}

/// Result of mapping a declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    pub name: Option<TypeName>,
    pub mapped: bool,
}

impl MappedType {
    fn mapped(name: TypeName) -> Self {
        Self {
            name: Some(name),
            mapped: true,
        }
    }
}

/// Maps declared types onto documented types
pub struct TypeMapper<'a> {
    model: &'a EntityModel,
    cache: &'a mut TypeMappingCache,
    infer: bool,
}

impl<'a> TypeMapper<'a> {
    pub fn new(model: &'a EntityModel, cache: &'a mut TypeMappingCache, infer: bool) -> Self {
        Self { model, cache, infer }
    }

    /// Map a declared type to its public counterpart
    ///
    /// Fallback order, first success wins:
    /// 1. no type: passed through, not mapped
    /// 2. a documented type (or `byte[]`): unchanged
    /// 3. a seed or cached mapping of the base name
    /// 4. with `allow_partial`: the first documented type, in declaration
    ///    order, with the same short name, then with the short name as its
    ///    public name
    /// 5. with inference: the first documented type extending or
    ///    implementing the type; remembered in the cache
    /// 6. unchanged, not mapped
    pub fn map_type(&mut self, ty: Option<&TypeName>, allow_partial: bool) -> MappedType {
        let Some(ty) = ty else {
            return MappedType {
                name: None,
                mapped: false,
            };
        };

        if self.is_documented(&ty.qualified) || (ty.qualified == "byte" && ty.dimensions == 1) {
            trace!(ty = %ty, "already public");
            return MappedType::mapped(ty.clone());
        }

        if let Some(target) = self.cache.get(&ty.qualified) {
            trace!(ty = %ty, to = %target.qualified, "mapped by table");
            return MappedType::mapped(retarget(ty, target));
        }

        if allow_partial && let Some(found) = self.partial_match(ty) {
            trace!(ty = %ty, to = %found.qualified_name, "mapped by name");
            return MappedType::mapped(retarget(ty, &MappingTarget::of(found)));
        }

        if self.infer && let Some(found) = self.infer_documented(&ty.qualified) {
            let target = MappingTarget::of(found);
            trace!(ty = %ty, to = %target.qualified, "inferred from hierarchy");
            self.cache.record(&ty.qualified, target.clone());
            return MappedType::mapped(retarget(ty, &target));
        }

        trace!(ty = %ty, "not mapped");
        MappedType {
            name: Some(ty.clone()),
            mapped: false,
        }
    }

    fn is_documented(&self, qualified: &str) -> bool {
        self.model.get_type(qualified).is_some_and(|t| t.documented)
    }

    fn documented(&self) -> impl Iterator<Item = &'a TypeEntity> {
        self.model.types().filter(|t| t.documented)
    }

    /// Candidates are the documented types only; the result is always public
    fn partial_match(&self, ty: &TypeName) -> Option<&'a TypeEntity> {
        self.documented()
            .find(|t| t.short_name == ty.short)
            .or_else(|| {
                self.documented()
                    .find(|t| t.public_name.as_deref() == Some(ty.short.as_str()))
            })
    }

    fn infer_documented(&self, qualified: &str) -> Option<&'a TypeEntity> {
        self.documented().find(|t| {
            t.supertype.as_deref() == Some(qualified) || t.interfaces.iter().any(|i| i == qualified)
        })
    }
}

/// Swap in a target's identity, keeping the binary name and dimensions
fn retarget(ty: &TypeName, target: &MappingTarget) -> TypeName {
    TypeName {
        qualified: target.qualified.clone(),
        short: target.short.clone(),
        binary: ty.binary.clone(),
        dimensions: ty.dimensions,
    }
}
