//! Registry → documentation output.
//!
//! - [`json_schema`]: JSON Schema (draft 2020-12), one `$defs` entry per
//!   registered identifier, references as `$ref` so cycles stay finite.
//! - [`sample_document`]: an example JSON value of a root type.
//!
//! Enums render as strings restricted to their constants.
use serde_json::{Map, Value, json};

use crate::registry::{SchemaRegistry, TypeIdentifier, TypeRepresentation};
use crate::types::Type;

const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// JSON kind of an opaque type, when it has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scalar {
    String,
    Integer,
    Number,
    Boolean,
}

fn scalar_of(ty: &Type) -> Option<Scalar> {
    let scalar = match ty.name() {
        "java.lang.String" | "java.lang.CharSequence" | "char" | "java.lang.Character" | "java.util.UUID"
        | "java.net.URI" | "java.net.URL" | "java.util.Date" | "java.time.Instant" | "java.time.LocalDate"
        | "java.time.LocalDateTime" | "java.time.OffsetDateTime" | "java.time.ZonedDateTime" => Scalar::String,
        "byte" | "short" | "int" | "long" | "java.lang.Byte" | "java.lang.Short" | "java.lang.Integer"
        | "java.lang.Long" | "java.math.BigInteger" => Scalar::Integer,
        "float" | "double" | "java.lang.Float" | "java.lang.Double" | "java.lang.Number" | "java.math.BigDecimal" => {
            Scalar::Number
        }
        "boolean" | "java.lang.Boolean" => Scalar::Boolean,
        _ => return None,
    };
    Some(scalar)
}

// ————————————————————————————————————————————————————————————————————————————
// JSON SCHEMA
// ————————————————————————————————————————————————————————————————————————————

/// Build a JSON Schema document describing `roots`.
pub fn json_schema(registry: &SchemaRegistry, roots: &[TypeIdentifier]) -> Value {
    let mut defs = Map::new();
    for (identifier, representation) in registry.iter() {
        defs.insert(identifier.to_string(), representation_schema(registry, representation));
    }

    let mut document = match roots {
        [root] => reference_schema(registry, root),
        _ => json!({ "oneOf": roots.iter().map(|root| reference_schema(registry, root)).collect::<Vec<_>>() }),
    };
    if let Value::Object(map) = &mut document {
        map.insert("$schema".into(), Value::from(SCHEMA_DIALECT));
        map.insert("$defs".into(), Value::Object(defs));
    }
    document
}

fn representation_schema(registry: &SchemaRegistry, representation: &TypeRepresentation) -> Value {
    match representation {
        TypeRepresentation::Concrete { properties } => {
            let mut props_map = Map::new();
            for (name, identifier) in properties {
                props_map.insert(name.clone(), reference_schema(registry, identifier));
            }
            json!({ "type": "object", "properties": Value::Object(props_map) })
        }
        TypeRepresentation::Collection { element } => {
            json!({ "type": "array", "items": reference_schema(registry, element) })
        }
        TypeRepresentation::Enumeration { constants } if constants.is_empty() => json!({ "type": "string" }),
        TypeRepresentation::Enumeration { constants } => json!({ "type": "string", "enum": constants }),
    }
}

/// `$ref` for registered identifiers, an inline schema for opaque ones.
fn reference_schema(registry: &SchemaRegistry, identifier: &TypeIdentifier) -> Value {
    if registry.contains(identifier) {
        return json!({ "$ref": format!("#/$defs/{}", escape_pointer(&identifier.to_string())) });
    }
    match scalar_of(identifier.ty()) {
        Some(Scalar::String) => json!({ "type": "string" }),
        Some(Scalar::Integer) => json!({ "type": "integer" }),
        Some(Scalar::Number) => json!({ "type": "number" }),
        Some(Scalar::Boolean) => json!({ "type": "boolean" }),
        None => json!({}),
    }
}

/// RFC 6901 token escaping.
fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

// ————————————————————————————————————————————————————————————————————————————
// SAMPLES
// ————————————————————————————————————————————————————————————————————————————

/// Example value of `root`. A type that recurs on its own path renders as `{}`.
pub fn sample_document(registry: &SchemaRegistry, root: &TypeIdentifier) -> Value {
    let mut path = Vec::new();
    sample_value(registry, root, &mut path)
}

/// One sample per root, keyed by root identifier.
pub fn sample_documents(registry: &SchemaRegistry, roots: &[TypeIdentifier]) -> Value {
    match roots {
        [root] => sample_document(registry, root),
        _ => Value::Object(
            roots.iter().map(|root| (root.to_string(), sample_document(registry, root))).collect(),
        ),
    }
}

fn sample_value<'r>(registry: &'r SchemaRegistry, identifier: &'r TypeIdentifier, path: &mut Vec<&'r TypeIdentifier>) -> Value {
    let Some(representation) = registry.get(identifier) else {
        return scalar_sample(identifier.ty());
    };
    if path.contains(&identifier) {
        return json!({});
    }
    path.push(identifier);
    let value = match representation {
        TypeRepresentation::Concrete { properties } => Value::Object(
            properties.iter().map(|(name, property)| (name.clone(), sample_value(registry, property, path))).collect(),
        ),
        TypeRepresentation::Collection { element } => Value::Array(vec![sample_value(registry, element, path)]),
        TypeRepresentation::Enumeration { constants } => {
            constants.first().map_or_else(|| json!("string"), |constant| json!(constant))
        }
    };
    path.pop();
    value
}

fn scalar_sample(ty: &Type) -> Value {
    match scalar_of(ty) {
        Some(Scalar::String) => json!("string"),
        Some(Scalar::Integer) => json!(0),
        Some(Scalar::Number) => json!(0.0),
        Some(Scalar::Boolean) => json!(false),
        None => json!({}),
    }
}

// ------------------------------- Tests ------------------------------------ //
