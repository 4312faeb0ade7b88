use std::collections::HashMap;
use std::mem::replace;
use std::path::Path;
use std::path::PathBuf;

use crate::log::debug;
use crate::module::ModuleRecord;
use crate::process::MemoryMapping;
use crate::Addr;


/// A catalog of modules with pre-built function tables.
pub trait ModuleCatalog {
    /// Find the module that is mapped by `mapping`.
    ///
    /// `addr` is the absolute address that is being resolved and lies
    /// within `mapping`. Implementations should report the module
    /// version that is actually mapped and nothing if that cannot be
    /// determined.
    fn find_module_for_mapping(&self, mapping: &MemoryMapping, addr: Addr)
        -> Option<&ModuleRecord>;

    /// Find a module by its identity.
    fn find_module_by_identity(&self, path: &Path, build_id: &str) -> Option<&ModuleRecord>;
}


/// A [`ModuleCatalog`] keeping modules in memory.
///
/// Multiple versions (build IDs) of a module with the same path may be
/// present at the same time.
#[derive(Debug, Default)]
pub struct ModuleManager {
    /// All known versions of modules, keyed by path.
    modules: HashMap<PathBuf, Vec<ModuleRecord>>,
}

impl ModuleManager {
    /// Create a new, empty [`ModuleManager`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module to the catalog.
    ///
    /// A module with the same identity that is already present gets
    /// replaced and is returned.
    pub fn add_module(&mut self, module: ModuleRecord) -> Option<ModuleRecord> {
        let versions = self.modules.entry(module.path().to_path_buf()).or_default();
        let idx = versions
            .iter()
            .position(|existing| existing.build_id() == module.build_id());
        if let Some(idx) = idx {
            debug!(
                "replacing module `{}` with build ID `{}`",
                module.path().display(),
                module.build_id()
            );
            Some(replace(&mut versions[idx], module))
        } else {
            let () = versions.push(module);
            None
        }
    }

    /// Retrieve the number of modules in the catalog.
    #[inline]
    pub fn len(&self) -> usize {
        self.modules.values().map(Vec::len).sum()
    }

    /// Check whether the catalog is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modules.values().all(Vec::is_empty)
    }

    /// Iterate over all modules in the catalog, in no particular order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.modules.values().flatten()
    }
}

impl ModuleCatalog for ModuleManager {
    fn find_module_for_mapping(
        &self,
        mapping: &MemoryMapping,
        addr: Addr,
    ) -> Option<&ModuleRecord> {
        if let Some(build_id) = &mapping.build_id {
            return self.find_module_by_identity(&mapping.path, build_id)
        }

        match self.modules.get(&mapping.path)?.as_slice() {
            [module] => Some(module),
            versions => {
                debug!(
                    "{} versions of `{}` are known and mapping for {addr:#x} carries no build ID; not guessing",
                    versions.len(),
                    mapping.path.display()
                );
                None
            }
        }
    }

    fn find_module_by_identity(&self, path: &Path, build_id: &str) -> Option<&ModuleRecord> {
        self.modules
            .get(path)?
            .iter()
            .find(|module| module.build_id() == build_id)
    }
}
