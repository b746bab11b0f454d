use std::sync::Arc;

use cloudplay_core::{
    CatalogService, CloudStorage, Config, ResolutionEngine, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    engine: Arc<ResolutionEngine>,
    catalog: Arc<CatalogService>,
}

impl AppState {
    /// Build the resolver and catalog on top of one cloud backend.
    pub fn new(config: Config, cloud: Arc<dyn CloudStorage>) -> Self {
        let engine = Arc::new(ResolutionEngine::new(
            config.resolver.clone(),
            Arc::clone(&cloud),
        ));
        let catalog = Arc::new(CatalogService::new(cloud, &config.catalog));
        Self::with_components(config, engine, catalog)
    }

    pub fn with_components(
        config: Config,
        engine: Arc<ResolutionEngine>,
        catalog: Arc<CatalogService>,
    ) -> Self {
        Self {
            config,
            engine,
            catalog,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn engine(&self) -> &ResolutionEngine {
        self.engine.as_ref()
    }

    pub fn catalog(&self) -> &CatalogService {
        self.catalog.as_ref()
    }
}
