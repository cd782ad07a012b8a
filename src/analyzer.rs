//! Recursive type-to-schema resolver.
//!
//! Walks a type graph depth first and registers one representation per
//! reachable identifier:
//! - wrappers are stripped, collections (including classes that extend one)
//!   become `Collection { element }`, enums become `Enumeration { constants }`,
//!   everything else becomes `Concrete { properties }`;
//! - properties are flattened over interfaces, then the superclass, then the
//!   class's own fields and getters, later sources overriding earlier ones;
//! - a type is marked visited *before* its properties are resolved, so
//!   cycles stop at the identifier instead of re-entering analysis;
//! - annotated occurrences reuse the representation of the plain type.
use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::access::{self, AccessPolicy};
use crate::error::AnalysisError;
use crate::generics::{BindingResolver, ResolutionScope, TypeResolver};
use crate::model::{ClassInfo, ClassRepository, Member};
use crate::normalize::TypeNormalizer;
use crate::registry::{AnalysisContext, Properties, SchemaRegistry, TypeIdentifier, TypeRepresentation};
use crate::settings::Settings;
use crate::types::{Type, TypeExpr};

pub struct TypeAnalyzer<'a, C: ?Sized, R = BindingResolver> {
    classes: &'a C,
    resolver: R,
    settings: &'a Settings,
    normalizer: TypeNormalizer<'a>,
}

/// Result of analyzing a batch of roots into one registry.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRun {
    pub registry: SchemaRegistry,
    /// One identifier per requested root, in request order.
    pub roots: Vec<TypeIdentifier>,
}

impl<'a, C: ClassRepository + ?Sized> TypeAnalyzer<'a, C> {
    pub fn new(classes: &'a C, settings: &'a Settings) -> Self {
        let resolver = BindingResolver::new(settings.default_element_type.clone());
        Self::with_resolver(classes, resolver, settings)
    }
}

impl<'a, C: ClassRepository + ?Sized, R: TypeResolver> TypeAnalyzer<'a, C, R> {
    pub fn with_resolver(classes: &'a C, resolver: R, settings: &'a Settings) -> Self {
        Self { classes, resolver, settings, normalizer: TypeNormalizer::new(settings) }
    }

    /// Analyze `root` and everything reachable from it into `ctx`'s registry.
    ///
    /// Always returns the root's identifier; opaque roots simply have no entry.
    pub fn analyze(&self, ctx: &mut AnalysisContext<'_>, root: &Type) -> Result<TypeIdentifier, AnalysisError> {
        self.analyze_occurrence(ctx, root, false)
    }

    fn analyze_occurrence(
        &self,
        ctx: &mut AnalysisContext<'_>,
        ty: &Type,
        annotated: bool,
    ) -> Result<TypeIdentifier, AnalysisError> {
        let ty = self.normalizer.normalize_wrapper(ty);
        self.register(ctx, &ty)?;
        let identifier = TypeIdentifier::of_member(ty, annotated);
        // annotated occurrences share the structure of the plain type
        if annotated && ctx.is_visited(identifier.ty()) {
            ctx.share_representation(identifier.clone());
        }
        Ok(identifier)
    }

    fn register(&self, ctx: &mut AnalysisContext<'_>, ty: &Type) -> Result<(), AnalysisError> {
        if ctx.is_visited(ty) {
            return Ok(());
        }
        let element = self.collection_element(ty);
        if element.is_none() && self.settings.is_opaque(ty) {
            return Ok(());
        }
        // must precede the recursion below
        ctx.mark_visited(ty.clone());
        match self.represent(ctx, ty, element) {
            Ok(representation) => {
                debug!(%ty, "registered representation");
                ctx.store(TypeIdentifier::of_type(ty.clone()), representation);
                Ok(())
            }
            Err(error) => {
                ctx.forget(ty);
                Err(error)
            }
        }
    }

    fn represent(
        &self,
        ctx: &mut AnalysisContext<'_>,
        ty: &Type,
        element: Option<Type>,
    ) -> Result<TypeRepresentation, AnalysisError> {
        if let Some(element) = element {
            self.register(ctx, &element)?;
            return Ok(TypeRepresentation::collection(TypeIdentifier::of_type(element)));
        }
        if !self.settings.is_opaque(ty) {
            let class = self.lookup(ty)?;
            if class.is_enum() {
                return Ok(TypeRepresentation::enumeration(class.enum_constants()));
            }
        }
        Ok(TypeRepresentation::concrete(self.class_properties(ctx, ty)?))
    }

    /// Element type when `ty` is a configured collection, an array, or a
    /// class on the class path that extends or implements one.
    fn collection_element(&self, ty: &Type) -> Option<Type> {
        let mut seen = HashSet::new();
        self.collection_element_in(ty, &mut seen)
    }

    fn collection_element_in(&self, ty: &Type, seen: &mut HashSet<Type>) -> Option<Type> {
        if self.normalizer.is_collection(ty) {
            return self.normalizer.normalize_collection(ty).ok();
        }
        if !seen.insert(ty.clone()) {
            return None;
        }
        let class = self.classes.find_class(ty.name()).ok()?;
        class
            .superclass
            .iter()
            .chain(&class.interfaces)
            .find_map(|declared| self.collection_element_in(&self.supertype(class, ty, declared), seen))
    }

    fn lookup(&self, ty: &Type) -> Result<&'a ClassInfo, AnalysisError> {
        let classes: &'a C = self.classes;
        classes.find_class(ty.name()).map_err(|source| AnalysisError::Lookup { ty: ty.to_string(), source })
    }

    fn class_properties(&self, ctx: &mut AnalysisContext<'_>, ty: &Type) -> Result<Properties, AnalysisError> {
        if self.settings.is_opaque(ty) {
            return Ok(Properties::new());
        }
        ctx.descend(ty, self.settings.max_depth)?;
        let properties = self.collect_properties(ctx, ty);
        ctx.ascend();
        properties
    }

    fn collect_properties(&self, ctx: &mut AnalysisContext<'_>, ty: &Type) -> Result<Properties, AnalysisError> {
        let class = self.lookup(ty)?;
        if class.is_enum() {
            return Ok(Properties::new());
        }
        let policy = self.access_policy(class);

        let mut properties = Properties::new();
        for interface in &class.interfaces {
            let interface = self.supertype(class, ty, interface);
            properties.extend(self.class_properties(ctx, &interface)?);
        }
        if let Some(superclass) = &class.superclass {
            let superclass = self.supertype(class, ty, superclass);
            properties.extend(self.class_properties(ctx, &superclass)?);
        }

        let class_scope = ResolutionScope::new(class, ty, &[]);
        for field in class.fields.iter().filter(|f| policy.is_field_relevant(f, self.settings)) {
            if let Some(identifier) = self.member_identifier(ctx, field, &field.ty, &class_scope)? {
                properties.insert(field.name.clone(), identifier);
            }
        }
        for method in class.methods.iter().filter(|m| policy.is_getter_relevant(m, self.settings)) {
            let Some(name) = access::property_name(&method.name) else {
                continue;
            };
            let scope = ResolutionScope::new(class, ty, &method.type_parameters);
            if let Some(identifier) = self.member_identifier(ctx, method, &method.return_type, &scope)? {
                properties.insert(name, identifier);
            }
        }
        Ok(properties)
    }

    /// `None` when the declared type cannot be made concrete.
    fn member_identifier(
        &self,
        ctx: &mut AnalysisContext<'_>,
        member: &impl Member,
        declared: &TypeExpr,
        scope: &ResolutionScope<'_>,
    ) -> Result<Option<TypeIdentifier>, AnalysisError> {
        match self.resolver.resolve(declared, scope) {
            Ok(resolved) => self.analyze_occurrence(ctx, &resolved, member.is_annotated()).map(Some),
            Err(error) => {
                trace!(owner = %scope.owner_type, member = member.name(), %error, "member skipped");
                Ok(None)
            }
        }
    }

    /// Bind a declared supertype against the owner; fall back to the raw type.
    fn supertype(&self, class: &ClassInfo, ty: &Type, declared: &TypeExpr) -> Type {
        let scope = ResolutionScope::new(class, ty, &[]);
        self.resolver.resolve(declared, &scope).unwrap_or_else(|error| {
            trace!(owner = %ty, supertype = %declared, %error, "using raw supertype");
            declared.erasure(&self.settings.default_element_type)
        })
    }

    /// Nearest declared accessor mode on the class or its superclasses.
    fn access_policy(&self, class: &'a ClassInfo) -> AccessPolicy {
        let classes: &'a C = self.classes;
        let mut current = class;
        let mut seen = HashSet::new();
        loop {
            if let Some(policy) = current.access_type {
                return policy;
            }
            if !seen.insert(current.name.as_str()) {
                break;
            }
            let Some(name) = current.superclass.as_ref().and_then(TypeExpr::head_name) else {
                break;
            };
            if self.settings.is_opaque_name(name) {
                break;
            }
            match classes.find_class(name) {
                Ok(superclass) => current = superclass,
                Err(error) => {
                    warn!(class = %class.name, %error, "accessor mode lookup incomplete, using the default");
                    break;
                }
            }
        }
        AccessPolicy::default()
    }
}

/// Analyze every root into a fresh registry.
pub fn analyze_roots<C: ClassRepository + ?Sized>(
    classes: &C,
    settings: &Settings,
    roots: &[Type],
) -> Result<AnalysisRun, AnalysisError> {
    let analyzer = TypeAnalyzer::new(classes, settings);
    let mut registry = SchemaRegistry::new();
    let mut identifiers = Vec::with_capacity(roots.len());
    {
        let mut ctx = AnalysisContext::new(&mut registry);
        for root in roots {
            identifiers.push(analyzer.analyze(&mut ctx, root)?);
        }
    }
    Ok(AnalysisRun { registry, roots: identifiers })
}

// ------------------------------- Tests ------------------------------------ //
