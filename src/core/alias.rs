// Public operation keyword -> canonical operation name, applied to template variables.
use std::collections::BTreeMap;

use crate::core::container::TextContainer;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AliasTable {
    names: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Aliases accepted in template variables out of the box.
    pub fn standard() -> Self {
        Self::empty().with_alias("json_paths", "jsonPaths")
    }

    pub fn with_alias(mut self, public: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.names.insert(public.into(), canonical.into());
        self
    }

    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names
            .iter()
            .map(|(public, canonical)| (public.as_str(), canonical.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Rename an aliased operation to its canonical form.
    ///
    /// Nested variables are left alone: they were normalized when they were
    /// decoded one level further down.
    pub fn normalize(&self, container: TextContainer) -> TextContainer {
        let Some(canonical) = container.operation_name().and_then(|name| self.canonical(name))
        else {
            return container;
        };
        tracing::trace!(
            from = container.operation_name().unwrap_or_default(),
            to = canonical,
            "aliased operation"
        );
        container.renamed(canonical)
    }
}
