//! Analysis errors

use thiserror::Error;

use crate::model::LookupError;

/// Failures that abort an analysis run.
///
/// Members whose type cannot be made concrete are not errors: they are
/// dropped from the property mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// A class, superclass or interface is missing from the class path
    #[error("could not load the class of `{ty}`")]
    Lookup {
        /// Type whose class was requested
        ty: String,
        #[source]
        source: LookupError,
    },

    /// Collection normalization applied to something that is not a collection
    #[error("`{ty}` is not a collection type")]
    NotACollection {
        /// Offending type
        ty: String,
    },

    /// Property nesting exceeded `Settings::max_depth`
    #[error("property nesting deeper than {limit} levels at `{ty}`")]
    DepthLimitExceeded {
        /// Configured limit
        limit: usize,
        /// Type being resolved when the limit was hit
        ty: String,
    },
}
