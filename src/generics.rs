//! Generic type resolution: turn a declared member type into a concrete
//! [`Type`] using the type arguments bound on the owning type.
use thiserror::Error;

use crate::model::ClassInfo;
use crate::types::{Type, TypeExpr, WildcardBound};

/// Everything a member type may be resolved against.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionScope<'s> {
    pub owner: &'s ClassInfo,
    /// The concrete owning type, carrying the bound arguments.
    pub owner_type: &'s Type,
    pub member_type_parameters: &'s [String],
}

/// Generic-substitution capability consumed by the analyzer.
pub trait TypeResolver {
    fn resolve(&self, declared: &TypeExpr, scope: &ResolutionScope<'_>) -> Result<Type, ResolveError>;
}

/// Why a member type could not be made concrete. The member is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("type variable `{name}` is not bound on `{owner}`")]
    Unbound { name: String, owner: String },
    #[error("method type variable `{name}` cannot be bound")]
    MethodVariable { name: String },
}

/// Positional substitution of class type parameters.
#[derive(Debug, Clone)]
pub struct BindingResolver {
    /// What `?` and `? super T` resolve to.
    fallback: Type,
}

impl<'s> ResolutionScope<'s> {
    pub fn new(owner: &'s ClassInfo, owner_type: &'s Type, member_type_parameters: &'s [String]) -> Self {
        Self { owner, owner_type, member_type_parameters }
    }
}

impl BindingResolver {
    pub fn new(fallback: Type) -> Self {
        Self { fallback }
    }
}

impl TypeResolver for BindingResolver {
    fn resolve(&self, declared: &TypeExpr, scope: &ResolutionScope<'_>) -> Result<Type, ResolveError> {
        match declared {
            TypeExpr::Named { name, args } if args.is_empty() => {
                // method variables shadow class variables
                if scope.member_type_parameters.iter().any(|p| p == name) {
                    return Err(ResolveError::MethodVariable { name: name.clone() });
                }
                match scope.owner.type_parameter_index(name) {
                    Some(index) => scope.owner_type.args().get(index).cloned().ok_or_else(|| ResolveError::Unbound {
                        name: name.clone(),
                        owner: scope.owner_type.to_string(),
                    }),
                    None => Ok(Type::new(name.clone())),
                }
            }
            TypeExpr::Named { name, args } => {
                let args = args.iter().map(|arg| self.resolve(arg, scope)).collect::<Result<Vec<_>, _>>()?;
                Ok(Type::with_args(name.clone(), args))
            }
            TypeExpr::Array(component) => Ok(Type::array_of(self.resolve(component, scope)?)),
            TypeExpr::Wildcard(Some(WildcardBound::Extends(bound))) => self.resolve(bound, scope),
            TypeExpr::Wildcard(_) => Ok(self.fallback.clone()),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
