//! Modeling languages: named catalogs of element types

pub mod builtin;
pub mod structure;

use crate::error::{ModelError, Result};
use crate::model::ElementType;

pub use self::builtin::CoreModelingLanguage;
pub use self::structure::StructureLanguage;

/// A named catalog of element types.
pub trait ModelingLanguage: Send + Sync {
    fn name(&self) -> &str;

    /// Every element type this language defines.
    fn element_types(&self) -> Vec<&'static ElementType>;

    /// Find an element type by name, optionally scoped to a namespace.
    fn lookup_element(&self, name: &str, namespace: Option<&str>) -> Result<Option<&'static ElementType>> {
        if let Some(ns) = namespace {
            if ns != self.name() {
                return Err(ModelError::UnknownNamespace(ns.to_string()));
            }
        }
        Ok(self.element_types().into_iter().find(|t| t.name == name))
    }
}

/// Several languages combined into one lookup.
pub struct CombinedModelingLanguage {
    languages: Vec<Box<dyn ModelingLanguage>>,
}

impl CombinedModelingLanguage {
    pub fn new(languages: Vec<Box<dyn ModelingLanguage>>) -> Self {
        CombinedModelingLanguage { languages }
    }
}

impl ModelingLanguage for CombinedModelingLanguage {
    fn name(&self) -> &str {
        "Combined"
    }

    fn element_types(&self) -> Vec<&'static ElementType> {
        self.languages.iter().flat_map(|l| l.element_types()).collect()
    }

    fn lookup_element(&self, name: &str, namespace: Option<&str>) -> Result<Option<&'static ElementType>> {
        match namespace {
            Some(ns) => {
                let language = self
                    .languages
                    .iter()
                    .find(|l| l.name().eq_ignore_ascii_case(ns))
                    .ok_or_else(|| ModelError::UnknownNamespace(ns.to_string()))?;
                language.lookup_element(name, Some(language.name()))
            }
            None => {
                for language in &self.languages {
                    if let Some(found) = language.lookup_element(name, None)? {
                        return Ok(Some(found));
                    }
                }
                Ok(None)
            }
        }
    }
}

/// The languages shipped with this crate: core types plus the structure notation.
pub fn default_language() -> CombinedModelingLanguage {
    CombinedModelingLanguage::new(vec![Box::new(CoreModelingLanguage), Box::new(StructureLanguage)])
}
