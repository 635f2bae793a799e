//! Per-run compiler state.

use trellis_core::{NodeCache, Settings};
use trellis_resources::ResourceTables;

/// Everything one compilation run owns. Passed by reference to each stage
/// and dropped with the run, so nothing leaks between runs.
#[derive(Debug, Clone)]
pub struct CompilationContext {
    pub settings: Settings,
    pub cache: NodeCache,
    pub tables: ResourceTables,
}

impl CompilationContext {
    pub fn new(settings: Settings, cache: NodeCache) -> Self {
        Self {
            settings,
            cache,
            tables: ResourceTables::new(),
        }
    }
}
