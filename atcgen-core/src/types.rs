//! Classification of declared Java type names
//!
//! The builder decides how to snapshot, guard and make symbolic a parameter
//! purely from the type name written in its signature.

use serde::{Deserialize, Serialize};

/// Return-type sentinel for functions without a result
pub const VOID: &str = "void";

/// Scalar types, unboxed and boxed
pub const PRIMITIVE_TYPES: &[&str] = &[
    "int",
    "long",
    "short",
    "byte",
    "double",
    "float",
    "boolean",
    "char",
    "Integer",
    "Long",
    "Short",
    "Byte",
    "Double",
    "Float",
    "Boolean",
    "Character",
];

/// Collection type names, matched after generic arguments are stripped
pub const COLLECTION_TYPES: &[&str] = &[
    "Set",
    "Map",
    "List",
    "Collection",
    "Queue",
    "Deque",
    "HashSet",
    "HashMap",
    "ArrayList",
    "LinkedList",
    "TreeSet",
    "TreeMap",
    "LinkedHashSet",
    "LinkedHashMap",
    "ArrayDeque",
];

const JAVA_UTIL_PREFIX: &str = "java.util.";

/// How a declared type behaves for snapshotting and null handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    /// Copied by value
    Primitive,
    /// Deep-copied into a fresh container of the same kind
    Collection,
    /// Aliased
    Reference,
}

impl TypeCategory {
    /// Whether a value of this category may be `null`
    pub fn is_nullable(self) -> bool {
        !matches!(self, TypeCategory::Primitive)
    }
}

/// `java.util.Map<K, V>` -> `Map`
pub fn base_type_name(type_name: &str) -> &str {
    let trimmed = type_name.trim();
    let without_generics = match trimmed.find('<') {
        Some(pos) => trimmed[..pos].trim_end(),
        None => trimmed,
    };
    without_generics
        .strip_prefix(JAVA_UTIL_PREFIX)
        .unwrap_or(without_generics)
}

/// Classify a declared type name
pub fn classify(type_name: &str) -> TypeCategory {
    let trimmed = type_name.trim();
    if PRIMITIVE_TYPES.contains(&trimmed) {
        return TypeCategory::Primitive;
    }
    if COLLECTION_TYPES.contains(&base_type_name(trimmed)) {
        return TypeCategory::Collection;
    }
    TypeCategory::Reference
}

/// `void` or empty
pub fn is_void(type_name: &str) -> bool {
    let trimmed = type_name.trim();
    trimmed.is_empty() || trimmed == VOID
}

/// Concrete implementation used to copy or construct a collection
///
/// Interfaces map to their default implementation; anything else is its
/// own concrete type.
pub fn concrete_collection(type_name: &str) -> &str {
    match base_type_name(type_name) {
        "Set" => "HashSet",
        "Map" => "HashMap",
        "List" | "Collection" => "ArrayList",
        "Queue" | "Deque" => "LinkedList",
        other => other,
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
