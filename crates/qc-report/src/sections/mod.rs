//! Per-module section builders and their registry.
//!
//! Every pipeline module has one [`SectionBuilder`]. The driver looks the
//! builder up in the [`SectionRegistry`] and calls it once per status file.
//! A builder returns `Ok(None)` when the status record is not complete, in
//! which case no report is produced for that file.
//!
//! # Example
//!
//! ```ignore
//! use qc_report::sections::default_registry;
//!
//! let builder = default_registry().get(ModuleKind::GeodesicDistance)?;
//! if let Some(section) = builder.build(&ctx, &renderers, &status_path)? {
//!     // assemble and write the report
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::Result;

use qc_core::ReportContext;
use qc_model::ModuleKind;

use crate::document::Section;
use crate::render::Renderers;

pub mod common;
mod gd;
mod mpc;
mod post_structural;
mod proc_func;
mod proc_structural;
mod proc_surf;
mod sc;

pub use gd::GeodesicDistanceSection;
pub use mpc::MicrostructuralSection;
pub use post_structural::PostStructuralSection;
pub use proc_func::ProcFuncSection;
pub use proc_structural::ProcStructuralSection;
pub use proc_surf::ProcSurfSection;
pub use sc::StructuralConnectomeSection;

/// Builds the report body for one pipeline module.
pub trait SectionBuilder: Send + Sync {
    /// Module whose status files this builder handles.
    fn module(&self) -> ModuleKind;

    /// Human-readable description of the builder.
    fn description(&self) -> &'static str {
        self.module().description()
    }

    /// Builds the section for the status record at `status_path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the status record or a descriptor the section
    /// depends on cannot be read. Missing output artifacts are not errors;
    /// they render as placeholders.
    fn build(
        &self,
        ctx: &ReportContext,
        renderers: &Renderers,
        status_path: &Path,
    ) -> Result<Option<Section>>;
}

/// Registry of section builders keyed by module.
#[derive(Default)]
pub struct SectionRegistry {
    builders: BTreeMap<ModuleKind, Box<dyn SectionBuilder>>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a builder for its module, replacing any previous one.
    pub fn register(&mut self, builder: Box<dyn SectionBuilder>) {
        self.builders.insert(builder.module(), builder);
    }

    pub fn get(&self, module: ModuleKind) -> Option<&dyn SectionBuilder> {
        self.builders.get(&module).map(|builder| builder.as_ref())
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Registered modules in driver order.
    pub fn modules(&self) -> impl Iterator<Item = ModuleKind> + '_ {
        self.builders.keys().copied()
    }
}

static DEFAULT_REGISTRY: OnceLock<SectionRegistry> = OnceLock::new();

/// Returns the registry with a builder for every module.
pub fn default_registry() -> &'static SectionRegistry {
    DEFAULT_REGISTRY.get_or_init(build_default_registry)
}

fn build_default_registry() -> SectionRegistry {
    let mut registry = SectionRegistry::new();
    registry.register(Box::new(ProcStructuralSection));
    registry.register(Box::new(ProcSurfSection));
    registry.register(Box::new(PostStructuralSection));
    registry.register(Box::new(ProcFuncSection));
    registry.register(Box::new(StructuralConnectomeSection));
    registry.register(Box::new(MicrostructuralSection));
    registry.register(Box::new(GeodesicDistanceSection));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_covers_every_module() {
        let registry = default_registry();
        assert_eq!(registry.len(), ModuleKind::ALL.len());
        for module in ModuleKind::ALL {
            let builder = registry.get(module).expect("builder registered");
            assert_eq!(builder.module(), module);
        }
    }

    #[test]
    fn modules_follow_driver_order() {
        let modules: Vec<_> = default_registry().modules().collect();
        assert_eq!(modules, ModuleKind::ALL.to_vec());
    }

    #[test]
    fn register_replaces_existing_builder() {
        let mut registry = SectionRegistry::new();
        assert!(registry.is_empty());
        registry.register(Box::new(GeodesicDistanceSection));
        registry.register(Box::new(GeodesicDistanceSection));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(ModuleKind::ProcSurf).is_none());
    }
}
