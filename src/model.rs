//! Class model: what reflection reports about a compiled class.
//!
//! The analyzer only ever reads classes through [`ClassRepository`], so any
//! introspection backend can stand behind it. [`ClassPath`] is the in-memory
//! implementation fed from JSON class model documents.
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::access::AccessPolicy;
use crate::types::{TypeExpr, is_qualified_name};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Transient,
    /// Compiler generated (bridge methods, `this$0`, ...).
    Synthetic,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    #[serde(deserialize_with = "qualified_name")]
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub type_parameters: Vec<String>,
    /// `None` for interfaces and for classes whose superclass is not worth
    /// describing (`java.lang.Object`).
    #[serde(default)]
    pub superclass: Option<TypeExpr>,
    #[serde(default)]
    pub interfaces: Vec<TypeExpr>,
    /// Class-level accessor annotation, if this class declares one.
    #[serde(default)]
    pub access_type: Option<AccessPolicy>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub name: String,
    pub return_type: TypeExpr,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub annotations: Vec<String>,
    /// Method-level type variables (`<T> T getValue()`); never bindable.
    #[serde(default)]
    pub type_parameters: Vec<String>,
}

/// Top-level shape of a class model document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassModelDocument {
    pub classes: Vec<ClassInfo>,
}

/// Common view over fields and methods.
pub trait Member {
    fn name(&self) -> &str;
    fn modifiers(&self) -> &[Modifier];
    fn annotations(&self) -> &[String];

    fn has(&self, modifier: Modifier) -> bool {
        self.modifiers().contains(&modifier)
    }

    /// Whether the member carries any member-level annotation at all.
    fn is_annotated(&self) -> bool {
        !self.annotations().is_empty()
    }
}

/// Reflection capability the analyzer consumes.
pub trait ClassRepository {
    fn find_class(&self, name: &str) -> Result<&ClassInfo, LookupError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("class `{0}` is not on the class path")]
    NotFound(String),
}

/// In-memory class path keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct ClassPath {
    classes: IndexMap<String, ClassInfo>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ClassInfo {
    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    /// Public static fields typed as the enum itself, in declaration order.
    pub fn enum_constants(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.has(Modifier::Public) && f.has(Modifier::Static))
            .filter(|f| f.ty.head_name() == Some(self.name.as_str()))
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn type_parameter_index(&self, name: &str) -> Option<usize> {
        self.type_parameters.iter().position(|p| p == name)
    }
}

impl Member for FieldInfo {
    fn name(&self) -> &str {
        &self.name
    }
    fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }
    fn annotations(&self) -> &[String] {
        &self.annotations
    }
}

impl Member for MethodInfo {
    fn name(&self) -> &str {
        &self.name
    }
    fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }
    fn annotations(&self) -> &[String] {
        &self.annotations
    }
}

impl ClassPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class. The first definition of a name wins, like on a JVM
    /// class path; returns `false` when `class` was shadowed.
    pub fn insert(&mut self, class: ClassInfo) -> bool {
        if self.classes.contains_key(&class.name) {
            tracing::warn!(class = %class.name, "duplicate class definition ignored");
            return false;
        }
        self.classes.insert(class.name.clone(), class);
        true
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }
}

impl ClassRepository for ClassPath {
    fn find_class(&self, name: &str) -> Result<&ClassInfo, LookupError> {
        self.classes.get(name).ok_or_else(|| LookupError::NotFound(name.to_string()))
    }
}

impl FromIterator<ClassInfo> for ClassPath {
    fn from_iter<I: IntoIterator<Item = ClassInfo>>(iter: I) -> Self {
        let mut class_path = ClassPath::new();
        for class in iter {
            class_path.insert(class);
        }
        class_path
    }
}

impl From<ClassModelDocument> for ClassPath {
    fn from(document: ClassModelDocument) -> Self {
        document.classes.into_iter().collect()
    }
}

fn qualified_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let name = String::deserialize(deserializer)?;
    if !is_qualified_name(&name) {
        return Err(serde::de::Error::custom(format!("`{name}` is not a valid qualified class name")));
    }
    Ok(name)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn class_path(value: serde_json::Value) -> ClassPath {
        serde_json::from_value::<ClassModelDocument>(value).unwrap().into()
    }

    #[test]
    fn decodes_a_class_with_defaults() {
        let classes = class_path(json!({ "classes": [
            {
                "name": "com.example.Box",
                "typeParameters": ["T"],
                "accessType": "FIELD",
                "fields": [{ "name": "value", "type": "T", "modifiers": ["private"] }],
                "methods": [{ "name": "getValue", "returnType": "T", "modifiers": ["public"] }]
            }
        ]}));
        let class = classes.find_class("com.example.Box").unwrap();
        assert_eq!(class.kind, ClassKind::Class);
        assert_eq!(class.access_type, Some(AccessPolicy::ByField));
        assert_eq!(class.type_parameter_index("T"), Some(0));
        assert!(class.superclass.is_none());
        assert!(class.fields[0].has(Modifier::Private));
        assert!(!class.fields[0].is_annotated());
        assert_eq!(class.methods[0].return_type, TypeExpr::named("T"));
    }

    #[test]
    fn missing_class_is_a_lookup_error() {
        let classes = ClassPath::new();
        assert_eq!(
            classes.find_class("com.example.Missing").unwrap_err(),
            LookupError::NotFound("com.example.Missing".into())
        );
    }

    #[test]
    fn first_definition_wins() {
        let classes = class_path(json!({ "classes": [
            { "name": "com.example.A", "kind": "enum" },
            { "name": "com.example.A", "kind": "class" }
        ]}));
        assert_eq!(classes.len(), 1);
        assert!(classes.find_class("com.example.A").unwrap().is_enum());
    }

    #[test]
    fn enum_constants_are_self_typed_public_statics() {
        let classes = class_path(json!({ "classes": [
            { "name": "com.example.Status", "kind": "enum", "fields": [
                { "name": "OPEN", "type": "com.example.Status", "modifiers": ["public", "static", "final"] },
                { "name": "CLOSED", "type": "com.example.Status", "modifiers": ["public", "static", "final"] },
                { "name": "$VALUES", "type": "com.example.Status[]", "modifiers": ["private", "static", "synthetic"] },
                { "name": "label", "type": "java.lang.String", "modifiers": ["private"] }
            ]}
        ]}));
        let status = classes.find_class("com.example.Status").unwrap();
        assert_eq!(status.enum_constants(), ["OPEN", "CLOSED"]);
    }

    #[test]
    fn rejects_invalid_names_and_types() {
        let bad_name = serde_json::from_value::<ClassModelDocument>(json!({ "classes": [{ "name": "not a name" }] }));
        assert!(bad_name.is_err());
        let bad_type = serde_json::from_value::<ClassModelDocument>(json!({ "classes": [
            { "name": "com.example.A", "fields": [{ "name": "x", "type": "List<" }] }
        ]}));
        assert!(bad_type.is_err());
    }
}
