//! Envelope and collection normalization.
use crate::error::AnalysisError;
use crate::settings::Settings;
use crate::types::Type;

#[derive(Debug, Clone, Copy)]
pub struct TypeNormalizer<'a> {
    settings: &'a Settings,
}

impl<'a> TypeNormalizer<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// `GenericEntity<Order>` → `Order`. A raw envelope stays as it is.
    pub fn normalize_wrapper(&self, ty: &Type) -> Type {
        match ty.args().first() {
            Some(payload) if self.settings.wrapper_types.contains(ty.name()) => payload.clone(),
            _ => ty.clone(),
        }
    }

    pub fn is_collection(&self, ty: &Type) -> bool {
        ty.is_array() || self.settings.collection_types.contains(ty.name())
    }

    /// Element type of a collection; raw collections hold the default element type.
    pub fn normalize_collection(&self, ty: &Type) -> Result<Type, AnalysisError> {
        if !self.is_collection(ty) {
            return Err(AnalysisError::NotACollection { ty: ty.to_string() });
        }
        Ok(ty.args().first().cloned().unwrap_or_else(|| self.settings.default_element_type.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> Type {
        s.parse().unwrap()
    }

    #[test]
    fn strips_one_envelope_level() {
        let settings = Settings::default();
        let normalizer = TypeNormalizer::new(&settings);
        assert_eq!(
            normalizer.normalize_wrapper(&ty("javax.ws.rs.core.GenericEntity<java.util.List<com.example.Item>>")),
            ty("java.util.List<com.example.Item>")
        );
        assert_eq!(normalizer.normalize_wrapper(&ty("javax.ws.rs.core.GenericEntity")), ty("javax.ws.rs.core.GenericEntity"));
        assert_eq!(normalizer.normalize_wrapper(&ty("com.example.Order")), ty("com.example.Order"));
    }

    #[test]
    fn collection_elements() {
        let settings = Settings::default();
        let normalizer = TypeNormalizer::new(&settings);
        assert_eq!(normalizer.normalize_collection(&ty("java.util.Set<com.example.Item>")).unwrap(), ty("com.example.Item"));
        assert_eq!(normalizer.normalize_collection(&ty("java.util.List")).unwrap(), ty("java.lang.Object"));
        assert_eq!(normalizer.normalize_collection(&ty("int[]")).unwrap(), ty("int"));
        assert!(!normalizer.is_collection(&ty("java.util.Map<java.lang.String, java.lang.String>")));
        assert_eq!(
            normalizer.normalize_collection(&ty("com.example.Order")).unwrap_err(),
            AnalysisError::NotACollection { ty: "com.example.Order".into() }
        );
    }
}
