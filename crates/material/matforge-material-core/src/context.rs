//! Shared, read-only schema state handed to every material.

use std::sync::Arc;

use matforge_params_core::{
    LayoutError, NoStructures, NodeSchema, ParameterLayout, SchemaId, SchemaRegistry,
    StructureSizeResolver,
};

use crate::config::GraphConfig;

/// The node-schema registry, the packed layout of each of its schemas and the
/// graph configuration. Built once at start-up; cloning shares the tables.
#[derive(Clone, Debug)]
pub struct SchemaContext {
    registry: Arc<SchemaRegistry>,
    layouts: Arc<[ParameterLayout]>,
    config: GraphConfig,
}

impl SchemaContext {
    /// Layouts are computed here, so `resolver` is only consulted once per schema.
    pub fn new(
        registry: Arc<SchemaRegistry>,
        resolver: &dyn StructureSizeResolver,
        config: GraphConfig,
    ) -> Self {
        let layouts = registry
            .iter()
            .map(|(id, schema)| ParameterLayout::compute(id, schema, resolver))
            .collect();
        SchemaContext {
            registry,
            layouts,
            config,
        }
    }

    /// Context for registries without structured parameters, with the default config.
    pub fn with_registry(registry: Arc<SchemaRegistry>) -> Self {
        Self::new(registry, &NoStructures, GraphConfig::default())
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn shared_registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn schema(&self, id: SchemaId) -> Result<&NodeSchema, LayoutError> {
        self.registry.schema(id)
    }

    pub fn layout(&self, id: SchemaId) -> Result<&ParameterLayout, LayoutError> {
        self.layouts
            .get(id.index())
            .ok_or(LayoutError::UnknownSchema(id))
    }

    pub fn init_defaults(&self, id: SchemaId) -> Result<Vec<u8>, LayoutError> {
        Ok(self.layout(id)?.init_defaults(self.schema(id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matforge_params_core::{ParameterDescriptor, ParameterType};

    #[test]
    fn layouts_use_the_resolver_once_per_schema() {
        let registry = SchemaRegistry::new(
            "t",
            vec![
                NodeSchema::new("A")
                    .with_param(ParameterDescriptor::new("s", ParameterType::Structure)),
                NodeSchema::new("B").with_param(ParameterDescriptor::new("f", ParameterType::Float)),
            ],
        )
        .unwrap();
        let calls = std::cell::Cell::new(0);
        let resolver = |_: SchemaId| {
            calls.set(calls.get() + 1);
            24
        };
        let ctx = SchemaContext::new(Arc::new(registry), &resolver, GraphConfig::default());
        assert_eq!(calls.get(), 1);
        assert_eq!(ctx.layout(SchemaId(0)).unwrap().total_size(), 24);
        assert_eq!(ctx.layout(SchemaId(1)).unwrap().total_size(), 4);
        assert!(ctx.layout(SchemaId(2)).is_err());
    }
}
