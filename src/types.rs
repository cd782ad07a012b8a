//! Type descriptors.
//!
//! Two shapes of "type" flow through the analyzer:
//! - [`Type`]: a concrete, fully bound type (`java.util.List<com.example.Item>`).
//!   This is what gets normalized, identified and registered.
//! - [`TypeExpr`]: a type as *declared* on a member. It may mention type
//!   variables (`T`), wildcards (`? extends T`) and arrays, and only becomes a
//!   [`Type`] once resolved against an owning type (see `generics`).
//!
//! Both are parsed from the same textual syntax.
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;

/// Pseudo-name carried by array types; the component is the single argument.
const ARRAY: &str = "[]";

static QUALIFIED_NAME: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(?:\.[A-Za-z_$][A-Za-z0-9_$]*)*$")
        .expect("qualified name pattern")
});

/// `com.example.Order`, `Outer$Inner`, `int`, `T`.
pub fn is_qualified_name(s: &str) -> bool {
    QUALIFIED_NAME.is_match(s)
}

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// A concrete type: qualified name plus bound generic arguments.
///
/// Equality is structural, so `List<Item>` seen from two different members is
/// the same `Type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct Type {
    name: String,
    args: Vec<Type>,
}

/// A declared member type, possibly open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum TypeExpr {
    /// A class name or a type variable, with optional arguments.
    Named { name: String, args: Vec<TypeExpr> },
    Array(Box<TypeExpr>),
    Wildcard(Option<WildcardBound>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Extends(Box<TypeExpr>),
    Super(Box<TypeExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeParseError {
    #[error("expected {expected} at offset {position}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
        position: usize,
    },
    #[error("`{name}` is not a valid qualified name")]
    InvalidName { name: String },
    #[error("wildcard in `{expr}` does not name a concrete type")]
    Wildcard { expr: String },
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Type {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), args: Vec::new() }
    }

    pub fn with_args(name: impl Into<String>, args: Vec<Type>) -> Self {
        Self { name: name.into(), args }
    }

    pub fn array_of(component: Type) -> Self {
        Self { name: ARRAY.to_string(), args: vec![component] }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Type] {
        &self.args
    }

    pub fn is_array(&self) -> bool {
        self.name == ARRAY
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array() {
            if let Some(component) = self.args.first() {
                return write!(f, "{component}[]");
            }
        }
        f.write_str(&self.name)?;
        write_args(f, &self.args)
    }
}

impl FromStr for Type {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.parse::<TypeExpr>()?;
        expr.to_concrete().ok_or_else(|| TypeParseError::Wildcard { expr: s.to_string() })
    }
}

impl TryFrom<String> for Type {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named { name: name.into(), args: Vec::new() }
    }

    /// Name of a `Named` expression with no arguments: a type variable
    /// candidate, or a plain class.
    pub fn bare_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named { name, args } if args.is_empty() => Some(name),
            _ => None,
        }
    }

    /// Head name of a `Named` expression, ignoring arguments.
    pub fn head_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Read every name literally, treating nothing as a type variable.
    /// `None` when the expression holds a wildcard.
    pub fn to_concrete(&self) -> Option<Type> {
        match self {
            TypeExpr::Named { name, args } => {
                let args = args.iter().map(TypeExpr::to_concrete).collect::<Option<Vec<_>>>()?;
                Some(Type::with_args(name.clone(), args))
            }
            TypeExpr::Array(component) => component.to_concrete().map(Type::array_of),
            TypeExpr::Wildcard(_) => None,
        }
    }

    /// Raw type with all arguments dropped. Wildcards erase to their upper
    /// bound, or to `fallback`.
    pub fn erasure(&self, fallback: &Type) -> Type {
        match self {
            TypeExpr::Named { name, .. } => Type::new(name.clone()),
            TypeExpr::Array(component) => Type::array_of(component.erasure(fallback)),
            TypeExpr::Wildcard(Some(WildcardBound::Extends(bound))) => bound.erasure(fallback),
            TypeExpr::Wildcard(_) => fallback.clone(),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named { name, args } => {
                f.write_str(name)?;
                write_args(f, args)
            }
            TypeExpr::Array(component) => write!(f, "{component}[]"),
            TypeExpr::Wildcard(None) => f.write_str("?"),
            TypeExpr::Wildcard(Some(WildcardBound::Extends(bound))) => write!(f, "? extends {bound}"),
            TypeExpr::Wildcard(Some(WildcardBound::Super(bound))) => write!(f, "? super {bound}"),
        }
    }
}

impl FromStr for TypeExpr {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse()
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn write_args<T: fmt::Display>(f: &mut fmt::Formatter<'_>, args: &[T]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(">")
}

// ————————————————————————————————————————————————————————————————————————————
// PARSER
// ————————————————————————————————————————————————————————————————————————————

// type     := wildcard | name args? dims
// wildcard := '?' (('extends' | 'super') type)?
// args     := '<' type (',' type)* '>'
// dims     := ('[' ']')*
struct Parser<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    fn parse(mut self) -> Result<TypeExpr, TypeParseError> {
        let expr = self.type_expr()?;
        self.skip_ws();
        if self.pos != self.src.len() {
            return Err(self.unexpected("end of input"));
        }
        Ok(expr)
    }

    fn type_expr(&mut self) -> Result<TypeExpr, TypeParseError> {
        self.skip_ws();
        if self.eat('?') {
            let bound = if self.keyword("extends") {
                Some(WildcardBound::Extends(Box::new(self.type_expr()?)))
            } else if self.keyword("super") {
                Some(WildcardBound::Super(Box::new(self.type_expr()?)))
            } else {
                None
            };
            return Ok(TypeExpr::Wildcard(bound));
        }

        let name = self.qualified_name()?;
        let mut args = Vec::new();
        self.skip_ws();
        if self.eat('<') {
            loop {
                args.push(self.type_expr()?);
                self.skip_ws();
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.unexpected("`,` or `>`"));
            }
        }

        let mut expr = TypeExpr::Named { name, args };
        loop {
            self.skip_ws();
            if !self.eat('[') {
                break;
            }
            self.skip_ws();
            if !self.eat(']') {
                return Err(self.unexpected("`]`"));
            }
            expr = TypeExpr::Array(Box::new(expr));
        }
        Ok(expr)
    }

    fn qualified_name(&mut self) -> Result<String, TypeParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        let name = &self.src[start..self.pos];
        if name.is_empty() {
            return Err(self.unexpected("a type name"));
        }
        if !is_qualified_name(name) {
            return Err(TypeParseError::InvalidName { name: name.to_string() });
        }
        Ok(name.to_string())
    }

    fn keyword(&mut self, kw: &str) -> bool {
        self.skip_ws();
        let rest = &self.src[self.pos..];
        if !rest.starts_with(kw) {
            return false;
        }
        let boundary = rest[kw.len()..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'));
        if boundary {
            self.pos += kw.len();
        }
        boundary
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn unexpected(&self, expected: &'static str) -> TypeParseError {
        let found = match self.peek() {
            Some(c) => format!("`{c}`"),
            None => "end of input".to_string(),
        };
        TypeParseError::Unexpected { expected, found, position: self.pos }
    }
}

// ------------------------------- Tests ------------------------------------ //
