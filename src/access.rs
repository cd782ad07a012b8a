//! Member exposure rules.
//!
//! A class-level accessor annotation selects one of three policies; the
//! policy then decides, member by member, what becomes a schema property.
//! Member-level annotations override the policy in both directions
//! (see `Settings::always_expose` / `Settings::never_expose`).
use serde::Deserialize;

use crate::model::{FieldInfo, Member, MethodInfo, Modifier};
use crate::settings::Settings;
use crate::types::TypeExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AccessPolicy {
    /// Fields are the source of truth.
    #[serde(rename = "FIELD")]
    ByField,
    /// Getters are the source of truth.
    #[serde(rename = "PROPERTY")]
    ByAccessor,
    /// Public, non-static fields and public getters.
    #[default]
    #[serde(rename = "PUBLIC_MEMBER")]
    PublicMembers,
}

impl AccessPolicy {
    pub fn is_field_relevant(self, field: &FieldInfo, settings: &Settings) -> bool {
        if field.has(Modifier::Synthetic) {
            return false;
        }
        if settings.always_exposes(field) {
            return true;
        }
        match self {
            AccessPolicy::ByField => {
                !field.has(Modifier::Transient) && !field.has(Modifier::Static) && !settings.never_exposes(field)
            }
            AccessPolicy::PublicMembers => {
                field.has(Modifier::Public) && !field.has(Modifier::Static) && !settings.never_exposes(field)
            }
            AccessPolicy::ByAccessor => false,
        }
    }

    pub fn is_getter_relevant(self, method: &MethodInfo, settings: &Settings) -> bool {
        if method.has(Modifier::Synthetic) || !is_getter(method, settings) {
            return false;
        }
        if settings.always_exposes(method) {
            return true;
        }
        match self {
            AccessPolicy::ByAccessor => !settings.never_exposes(method),
            AccessPolicy::PublicMembers => method.has(Modifier::Public) && !settings.never_exposes(method),
            AccessPolicy::ByField => false,
        }
    }
}

/// `getX()` returning anything but `void`, or `isX()` returning `boolean`.
pub fn is_getter(method: &MethodInfo, settings: &Settings) -> bool {
    if method.has(Modifier::Static) {
        return false;
    }
    let name = method.name.as_str();
    if settings.ignored_getters.contains(name) {
        return false;
    }
    if name.starts_with("get") && name.len() > 3 {
        return !returns(&method.return_type, "void");
    }
    name.starts_with("is") && name.len() > 2 && returns(&method.return_type, "boolean")
}

fn returns(return_type: &TypeExpr, primitive: &str) -> bool {
    return_type.bare_name() == Some(primitive)
}

/// Property name of a getter: prefix stripped, first character lowercased.
///
/// Only the first character changes, so `getURL` yields `uRL`.
pub fn property_name(getter: &str) -> Option<String> {
    let rest = match getter.strip_prefix("is") {
        Some(rest) => rest,
        None => getter.strip_prefix("get")?,
    };
    let mut chars = rest.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

// ------------------------------- Tests ------------------------------------ //
