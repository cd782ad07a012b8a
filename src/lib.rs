//! Resolve reflected class graphs into a flat, cycle-safe schema registry,
//! and render that registry as JSON Schema or sample documents.
pub mod access;
pub mod analyzer;
pub mod emit;
pub mod error;
pub mod generics;
pub mod jq_exec;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod path_de;
pub mod registry;
pub mod settings;
pub mod types;

pub use access::AccessPolicy;
pub use analyzer::{AnalysisRun, TypeAnalyzer, analyze_roots};
pub use error::AnalysisError;
pub use model::{ClassInfo, ClassPath, ClassRepository};
pub use registry::{AnalysisContext, SchemaRegistry, TypeIdentifier, TypeRepresentation};
pub use settings::Settings;
pub use types::{Type, TypeExpr};
