//! Schema registry: identifiers, representations, and the per-run context.
//!
//! Representations never embed each other; they point at [`TypeIdentifier`]s.
//! That indirection is what lets `A → B → A` live in the registry as two
//! finite entries.
use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Serialize, Serializer};

use crate::error::AnalysisError;
use crate::types::Type;

pub type Properties = IndexMap<String, TypeIdentifier>;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Registry key: a normalized type plus whether the member occurrence that
/// produced it carried annotations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdentifier {
    ty: Type,
    annotated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeRepresentation {
    Concrete { properties: Properties },
    Collection { element: TypeIdentifier },
    /// An enum type: no properties, only its constants in declaration order.
    Enumeration { constants: Vec<String> },
}

/// Identifier → representation. Grows only.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    entries: IndexMap<TypeIdentifier, TypeRepresentation>,
}

/// Mutable state of one analysis run, threaded through every recursive call.
#[derive(Debug)]
pub struct AnalysisContext<'r> {
    registry: &'r mut SchemaRegistry,
    /// Types whose structural analysis has started.
    visited: HashSet<Type>,
    /// Annotated identifiers waiting for the representation of their type.
    pending: HashMap<Type, Vec<TypeIdentifier>>,
    depth: usize,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeIdentifier {
    pub fn of_type(ty: Type) -> Self {
        Self { ty, annotated: false }
    }

    pub fn of_member(ty: Type, annotated: bool) -> Self {
        Self { ty, annotated }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn is_annotated(&self) -> bool {
        self.annotated
    }
}

impl fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.annotated {
            write!(f, "{} (annotated)", self.ty)
        } else {
            write!(f, "{}", self.ty)
        }
    }
}

impl Serialize for TypeIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl TypeRepresentation {
    pub fn concrete(properties: Properties) -> Self {
        TypeRepresentation::Concrete { properties }
    }

    pub fn collection(element: TypeIdentifier) -> Self {
        TypeRepresentation::Collection { element }
    }

    pub fn enumeration(constants: Vec<String>) -> Self {
        TypeRepresentation::Enumeration { constants }
    }

    pub fn properties(&self) -> Option<&Properties> {
        match self {
            TypeRepresentation::Concrete { properties } => Some(properties),
            TypeRepresentation::Collection { .. } | TypeRepresentation::Enumeration { .. } => None,
        }
    }

    pub fn element(&self) -> Option<&TypeIdentifier> {
        match self {
            TypeRepresentation::Collection { element } => Some(element),
            TypeRepresentation::Concrete { .. } | TypeRepresentation::Enumeration { .. } => None,
        }
    }

    pub fn constants(&self) -> Option<&[String]> {
        match self {
            TypeRepresentation::Enumeration { constants } => Some(constants),
            _ => None,
        }
    }

    /// Every identifier this representation points at.
    pub fn references(&self) -> Vec<&TypeIdentifier> {
        match self {
            TypeRepresentation::Concrete { properties } => properties.values().collect(),
            TypeRepresentation::Collection { element } => vec![element],
            TypeRepresentation::Enumeration { .. } => Vec::new(),
        }
    }
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: &TypeIdentifier) -> Option<&TypeRepresentation> {
        self.entries.get(identifier)
    }

    pub fn contains(&self, identifier: &TypeIdentifier) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeIdentifier, &TypeRepresentation)> {
        self.entries.iter()
    }

    /// Add an entry unless the identifier is already registered; existing
    /// representations are never replaced.
    pub fn register(&mut self, identifier: TypeIdentifier, representation: TypeRepresentation) -> bool {
        match self.entries.entry(identifier) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(representation);
                true
            }
        }
    }

    /// Referenced identifiers that are neither registered nor opaque.
    /// Empty for any registry produced by the analyzer.
    pub fn dangling_references(&self, is_opaque: impl Fn(&Type) -> bool) -> Vec<&TypeIdentifier> {
        let mut dangling = Vec::new();
        for representation in self.entries.values() {
            for reference in representation.references() {
                if !self.contains(reference) && !is_opaque(reference.ty()) && !dangling.contains(&reference) {
                    dangling.push(reference);
                }
            }
        }
        dangling
    }
}

impl<'r> AnalysisContext<'r> {
    pub fn new(registry: &'r mut SchemaRegistry) -> Self {
        Self { registry, visited: HashSet::new(), pending: HashMap::new(), depth: 0 }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &*self.registry
    }

    pub fn is_visited(&self, ty: &Type) -> bool {
        self.visited.contains(ty)
    }

    pub(crate) fn mark_visited(&mut self, ty: Type) -> bool {
        self.visited.insert(ty)
    }

    /// Undo `mark_visited` after a failed analysis, so a retry fails the same way.
    pub(crate) fn forget(&mut self, ty: &Type) {
        self.visited.remove(ty);
        self.pending.remove(ty);
    }

    pub(crate) fn store(&mut self, identifier: TypeIdentifier, representation: TypeRepresentation) {
        let aliases = if identifier.is_annotated() {
            Vec::new()
        } else {
            self.pending.remove(identifier.ty()).unwrap_or_default()
        };
        for alias in aliases {
            self.registry.register(alias, representation.clone());
        }
        self.registry.register(identifier, representation);
    }

    /// Register `annotated` with the representation of its plain type, now if
    /// that is already stored, otherwise as soon as it is.
    pub(crate) fn share_representation(&mut self, annotated: TypeIdentifier) {
        if self.registry.contains(&annotated) {
            return;
        }
        let plain = TypeIdentifier::of_type(annotated.ty().clone());
        match self.registry.get(&plain).cloned() {
            Some(representation) => {
                self.registry.register(annotated, representation);
            }
            None => self.pending.entry(annotated.ty().clone()).or_default().push(annotated),
        }
    }

    pub(crate) fn descend(&mut self, ty: &Type, limit: usize) -> Result<(), AnalysisError> {
        if self.depth >= limit {
            return Err(AnalysisError::DepthLimitExceeded { limit, ty: ty.to_string() });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(s: &str) -> TypeIdentifier {
        TypeIdentifier::of_type(s.parse().unwrap())
    }

    #[test]
    fn annotation_flag_distinguishes_identifiers() {
        let plain = id("com.example.Item");
        let annotated = TypeIdentifier::of_member("com.example.Item".parse().unwrap(), true);
        assert_ne!(plain, annotated);
        assert_eq!(plain, id("com.example.Item"));
        assert_eq!(annotated.to_string(), "com.example.Item (annotated)");
    }

    #[test]
    fn registry_never_replaces_entries() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.register(id("com.example.A"), TypeRepresentation::concrete(Properties::new())));
        assert!(!registry.register(id("com.example.A"), TypeRepresentation::collection(id("int"))));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&id("com.example.A")).unwrap().properties().is_some());
    }

    #[test]
    fn serializes_identifiers_as_strings() {
        let mut registry = SchemaRegistry::new();
        let mut properties = Properties::new();
        properties.insert("items".into(), id("java.util.List<com.example.Item>"));
        registry.register(id("com.example.Order"), TypeRepresentation::concrete(properties));
        registry.register(id("java.util.List<com.example.Item>"), TypeRepresentation::collection(id("com.example.Item")));

        let value = serde_json::to_value(&registry).unwrap();
        assert_eq!(value, json!({
            "com.example.Order": { "kind": "concrete", "properties": { "items": "java.util.List<com.example.Item>" } },
            "java.util.List<com.example.Item>": { "kind": "collection", "element": "com.example.Item" }
        }));
    }

    #[test]
    fn reports_dangling_references() {
        let mut registry = SchemaRegistry::new();
        let mut properties = Properties::new();
        properties.insert("id".into(), id("long"));
        properties.insert("owner".into(), id("com.example.Customer"));
        registry.register(id("com.example.Order"), TypeRepresentation::concrete(properties));

        let dangling = registry.dangling_references(|ty| ty.name() == "long");
        assert_eq!(dangling, vec![&id("com.example.Customer")]);
    }

    #[test]
    fn annotated_identifiers_wait_for_their_type() {
        let mut registry = SchemaRegistry::new();
        let mut ctx = AnalysisContext::new(&mut registry);
        let ty: Type = "com.example.Node".parse().unwrap();
        let annotated = TypeIdentifier::of_member(ty.clone(), true);

        ctx.mark_visited(ty.clone());
        ctx.share_representation(annotated.clone());
        assert!(!ctx.registry().contains(&annotated));

        ctx.store(id("com.example.Node"), TypeRepresentation::concrete(Properties::new()));
        assert_eq!(ctx.registry().get(&annotated), ctx.registry().get(&id("com.example.Node")));
        assert_eq!(ctx.registry().len(), 2);
    }

    #[test]
    fn forgotten_types_can_be_analyzed_again() {
        let mut registry = SchemaRegistry::new();
        let mut ctx = AnalysisContext::new(&mut registry);
        let ty: Type = "com.example.Node".parse().unwrap();
        assert!(ctx.mark_visited(ty.clone()));
        ctx.share_representation(TypeIdentifier::of_member(ty.clone(), true));
        ctx.forget(&ty);
        assert!(!ctx.is_visited(&ty));

        ctx.store(id("com.example.Node"), TypeRepresentation::concrete(Properties::new()));
        assert_eq!(ctx.registry().len(), 1);
    }

    #[test]
    fn enumerations_reference_nothing() {
        let status = TypeRepresentation::enumeration(vec!["OPEN".into()]);
        assert!(status.references().is_empty());
        assert_eq!(status.constants(), Some(&["OPEN".to_string()][..]));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!({ "kind": "enumeration", "constants": ["OPEN"] }));
    }

    #[test]
    fn depth_guard() {
        let mut registry = SchemaRegistry::new();
        let mut ctx = AnalysisContext::new(&mut registry);
        let ty: Type = "com.example.A".parse().unwrap();
        ctx.descend(&ty, 2).unwrap();
        ctx.descend(&ty, 2).unwrap();
        assert!(matches!(ctx.descend(&ty, 2), Err(AnalysisError::DepthLimitExceeded { limit: 2, .. })));
        ctx.ascend();
        assert!(ctx.descend(&ty, 2).is_ok());
    }
}
