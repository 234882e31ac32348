//! Endpoint registry.
//!
//! Maps every category to its descriptor. Built-in descriptors are created
//! once; a registry instance may override individual paths.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use abaco_core::Category;

use crate::descriptor::EndpointDescriptor;

// ============================================================================
// Static Defaults
// ============================================================================

/// Built-in descriptors, in category order.
static DEFAULTS: OnceLock<Vec<EndpointDescriptor>> = OnceLock::new();

fn init_defaults() -> Vec<EndpointDescriptor> {
    Category::all()
        .iter()
        .map(|c| EndpointDescriptor::default_for(*c))
        .collect()
}

// ============================================================================
// Endpoint Registry
// ============================================================================

/// Descriptor lookup for all categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRegistry {
    descriptors: BTreeMap<Category, EndpointDescriptor>,
}

impl EndpointRegistry {
    /// Returns the built-in descriptors.
    pub fn defaults() -> &'static [EndpointDescriptor] {
        DEFAULTS.get_or_init(init_defaults)
    }

    /// Creates a registry with the built-in descriptors.
    pub fn new() -> Self {
        Self {
            descriptors: Self::defaults()
                .iter()
                .map(|d| (d.category, d.clone()))
                .collect(),
        }
    }

    /// Overrides the path of one category, keeping its pagination scheme.
    #[must_use]
    pub fn with_override(mut self, category: Category, path: &str) -> Self {
        let pagination = self
            .get(category)
            .map_or_else(|| EndpointDescriptor::default_for(category).pagination, |d| d.pagination);
        self.descriptors
            .insert(category, EndpointDescriptor::new(category, path, pagination));
        self
    }

    /// Applies a set of path overrides.
    #[must_use]
    pub fn with_overrides<'a>(
        self,
        overrides: impl IntoIterator<Item = (Category, &'a str)>,
    ) -> Self {
        overrides
            .into_iter()
            .fold(self, |registry, (category, path)| registry.with_override(category, path))
    }

    /// Gets the descriptor for a category.
    pub fn get(&self, category: Category) -> Option<&EndpointDescriptor> {
        self.descriptors.get(&category)
    }

    /// Iterates descriptors in category order.
    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.descriptors.values()
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
