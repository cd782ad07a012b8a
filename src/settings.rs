//! Analyzer configuration.
//!
//! Everything that decides *which* names are special (primitives, platform
//! namespaces, envelopes, collections, exposure annotations) lives here so the
//! analyzer itself only carries rules.
use indexmap::IndexSet;
use serde::Deserialize;

use crate::model::Member;
use crate::path_de::{self, DecodeError};
use crate::types::Type;

// ------------------------------- Defaults --------------------------------- //

const PRIMITIVE_TYPES: &[&str] = &["boolean", "byte", "char", "short", "int", "long", "float", "double", "void"];

/// Reserved namespaces: never expanded into properties.
const OPAQUE_PREFIXES: &[&str] = &["java.", "javax."];

const WRAPPER_TYPES: &[&str] = &["javax.ws.rs.core.GenericEntity", "jakarta.ws.rs.core.GenericEntity"];

/// `java.util.Collection` and its platform implementations. Classes on the
/// class path that extend or implement one of these are collections too.
const COLLECTION_TYPES: &[&str] = &[
    "java.lang.Iterable",
    "java.util.Collection",
    "java.util.List",
    "java.util.Set",
    "java.util.SortedSet",
    "java.util.NavigableSet",
    "java.util.Queue",
    "java.util.Deque",
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.TreeSet",
    "java.util.ArrayDeque",
    "java.util.AbstractCollection",
    "java.util.AbstractList",
    "java.util.AbstractSequentialList",
    "java.util.AbstractSet",
    "java.util.AbstractQueue",
    "java.util.Vector",
    "java.util.Stack",
    "java.util.PriorityQueue",
    "java.util.EnumSet",
    "java.util.concurrent.BlockingQueue",
    "java.util.concurrent.BlockingDeque",
    "java.util.concurrent.TransferQueue",
    "java.util.concurrent.CopyOnWriteArrayList",
    "java.util.concurrent.CopyOnWriteArraySet",
    "java.util.concurrent.ConcurrentLinkedQueue",
    "java.util.concurrent.ConcurrentLinkedDeque",
    "java.util.concurrent.ConcurrentSkipListSet",
    "java.util.concurrent.ArrayBlockingQueue",
    "java.util.concurrent.LinkedBlockingQueue",
    "java.util.concurrent.LinkedBlockingDeque",
    "java.util.concurrent.LinkedTransferQueue",
    "java.util.concurrent.PriorityBlockingQueue",
    "java.util.concurrent.DelayQueue",
    "java.util.concurrent.SynchronousQueue",
];

const DEFAULT_ELEMENT_TYPE: &str = "java.lang.Object";

const IGNORED_GETTERS: &[&str] = &["getClass"];

const ALWAYS_EXPOSE: &[&str] = &["javax.xml.bind.annotation.XmlElement", "jakarta.xml.bind.annotation.XmlElement"];

const NEVER_EXPOSE: &[&str] = &["javax.xml.bind.annotation.XmlTransient", "jakarta.xml.bind.annotation.XmlTransient"];

const MAX_DEPTH: usize = 512;

// ------------------------------- Settings --------------------------------- //

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub primitive_types: IndexSet<String>,
    pub opaque_prefixes: Vec<String>,
    /// Envelope types; the first type argument is the payload.
    pub wrapper_types: IndexSet<String>,
    pub collection_types: IndexSet<String>,
    /// Element type of a raw collection, and what unbounded wildcards resolve to.
    pub default_element_type: Type,
    pub ignored_getters: IndexSet<String>,
    pub always_expose: IndexSet<String>,
    pub never_expose: IndexSet<String>,
    /// Maximum nesting of class property resolution.
    pub max_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        fn set(names: &[&str]) -> IndexSet<String> {
            names.iter().map(|s| s.to_string()).collect()
        }
        Self {
            primitive_types: set(PRIMITIVE_TYPES),
            opaque_prefixes: OPAQUE_PREFIXES.iter().map(|s| s.to_string()).collect(),
            wrapper_types: set(WRAPPER_TYPES),
            collection_types: set(COLLECTION_TYPES),
            default_element_type: Type::new(DEFAULT_ELEMENT_TYPE),
            ignored_getters: set(IGNORED_GETTERS),
            always_expose: set(ALWAYS_EXPOSE),
            never_expose: set(NEVER_EXPOSE),
            max_depth: MAX_DEPTH,
        }
    }
}

impl Settings {
    /// Parse a JSON settings document; absent keys keep their defaults.
    pub fn from_json_str(src: &str) -> Result<Self, DecodeError> {
        path_de::from_str_with_path(src)
    }

    /// Primitives and reserved platform namespaces.
    pub fn is_opaque(&self, ty: &Type) -> bool {
        self.is_opaque_name(ty.name())
    }

    pub fn is_opaque_name(&self, name: &str) -> bool {
        self.primitive_types.contains(name) || self.opaque_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    pub fn always_exposes(&self, member: &impl Member) -> bool {
        has_annotation(&self.always_expose, member)
    }

    pub fn never_exposes(&self, member: &impl Member) -> bool {
        has_annotation(&self.never_expose, member)
    }
}

/// Annotations may be written qualified or by simple name.
fn has_annotation(configured: &IndexSet<String>, member: &impl Member) -> bool {
    member.annotations().iter().any(|annotation| {
        configured.iter().any(|qualified| {
            qualified == annotation || qualified.rsplit('.').next() == Some(annotation.as_str())
        })
    })
}

// ------------------------------- Tests ------------------------------------ //
