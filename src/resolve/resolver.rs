use std::borrow::Cow;
use std::path::Path;

use crate::address::abs_addr_to_file_offset;
use crate::address::file_offset_to_virt_addr;
use crate::address::virt_addr_to_abs_addr;
use crate::capture::CaptureView;
use crate::catalog::ModuleCatalog;
use crate::log::debug;
use crate::log::trace;
use crate::module::FunctionRecord;
use crate::module::Lookup;
use crate::module::ModuleRecord;
use crate::process::MemoryMapping;
use crate::process::ProcessAddressSpace;
#[cfg(feature = "tracing")]
use crate::util::Hexify;
use crate::Addr;

use super::maybe_demangle;
use super::Strategy;
use super::Sym;
use super::Symbolized;
use super::UNKNOWN_NAME;


/// A function found for an address, along with the module containing
/// it.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedFunction<'a> {
    /// The memory mapping through which the function was found, if it
    /// was found by absolute address.
    pub mapping: Option<&'a MemoryMapping>,
    /// The module containing the function.
    pub module: &'a ModuleRecord,
    /// The function.
    pub function: &'a FunctionRecord,
}

impl ResolvedFunction<'_> {
    /// The absolute address at which the function starts.
    ///
    /// Only available if the function was found through a memory
    /// mapping.
    pub fn abs_addr(&self) -> Option<Addr> {
        let mapping = self.mapping?;
        virt_addr_to_abs_addr(
            self.function.virt_addr(),
            mapping.start(),
            self.module.load_bias(),
            self.module.executable_segment_offset(),
        )
    }

    /// The offset of the function's start into the module file.
    #[inline]
    pub fn file_offset(&self) -> Option<u64> {
        self.module.function_file_offset(self.function)
    }
}


/// A builder for configurable construction of [`Resolver`] objects.
///
/// By default demangling is enabled.
#[derive(Clone, Debug)]
pub struct Builder {
    /// See [`Builder::enable_demangling`].
    demangle: bool,
}

impl Builder {
    /// Enable/disable the demangling of function names.
    ///
    /// Demangling happens on a best-effort basis for Rust and C++
    /// symbols and only if the `demangle` feature is enabled. Names
    /// reported by address hints are never demangled.
    pub fn enable_demangling(mut self, enable: bool) -> Builder {
        self.demangle = enable;
        self
    }

    /// Create the [`Resolver`] object.
    pub fn build(self) -> Resolver {
        let Builder { demangle } = self;

        Resolver { demangle }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self { demangle: true }
    }
}


/// A resolver of absolute addresses of a captured process.
///
/// A `Resolver` holds configuration only. Queries operate on the
/// provided process, module catalog, and capture snapshots, and the
/// references they hand out are tied to those.
///
/// Queries that can fall back to address hints consult the
/// [`Strategy`] objects in [`Strategy::ALL`] order and report the first
/// answer.
#[derive(Clone, Debug)]
pub struct Resolver {
    /// See [`Builder::enable_demangling`].
    pub(crate) demangle: bool,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Create a new [`Resolver`].
    ///
    /// This method is just a short hand for instantiating a `Resolver`
    /// from the default [`Builder`].
    #[inline]
    pub fn new() -> Self {
        Builder::default().build()
    }

    /// Retrieve a [`Builder`] object for configurable construction of a
    /// [`Resolver`].
    #[inline]
    pub fn builder() -> Builder {
        Builder::default()
    }

    fn find_mapped_module<'a>(
        &self,
        process: &'a dyn ProcessAddressSpace,
        catalog: &'a dyn ModuleCatalog,
        addr: Addr,
    ) -> Option<(&'a MemoryMapping, &'a ModuleRecord)> {
        let Some(mapping) = process.find_mapping(addr) else {
            trace!("no mapping contains {addr:#x}");
            return None
        };
        let Some(module) = catalog.find_module_for_mapping(mapping, addr) else {
            trace!(
                "no module found for mapping of `{}` containing {addr:#x}",
                mapping.path().display()
            );
            return None
        };
        Some((mapping, module))
    }

    fn first_resolution<T, F>(addr: Addr, mut resolve: F) -> Option<T>
    where
        F: FnMut(Strategy) -> Option<T>,
    {
        Strategy::ALL.into_iter().find_map(|strategy| {
            let result = resolve(strategy);
            if result.is_some() {
                trace!("resolved {addr:#x} using {strategy:?} strategy");
            }
            result
        })
    }

    /// Find the module mapped at absolute address `addr`.
    #[cfg_attr(feature = "tracing", crate::log::instrument(skip_all, fields(addr = format_args!("{addr:#x}"))))]
    pub fn find_module<'a>(
        &self,
        process: &'a dyn ProcessAddressSpace,
        catalog: &'a dyn ModuleCatalog,
        addr: Addr,
    ) -> Option<&'a ModuleRecord> {
        self.find_mapped_module(process, catalog, addr)
            .map(|(_mapping, module)| module)
    }

    /// Find the build ID of the module mapped at absolute address
    /// `addr`.
    pub fn find_module_build_id<'a>(
        &self,
        process: &'a dyn ProcessAddressSpace,
        catalog: &'a dyn ModuleCatalog,
        addr: Addr,
    ) -> Option<&'a str> {
        self.find_module(process, catalog, addr)
            .map(ModuleRecord::build_id)
    }

    /// Find the function covering absolute address `addr`, using the
    /// live process state only.
    ///
    /// `lookup` controls whether the address has to fall into the
    /// function's recorded extent or whether the closest function
    /// starting at or before it is reported.
    #[cfg_attr(feature = "tracing", crate::log::instrument(skip(self, process, catalog), fields(addr = format_args!("{addr:#x}"))))]
    pub fn find_function<'a>(
        &self,
        process: &'a dyn ProcessAddressSpace,
        catalog: &'a dyn ModuleCatalog,
        addr: Addr,
        lookup: Lookup,
    ) -> Option<ResolvedFunction<'a>> {
        let (mapping, module) = self.find_mapped_module(process, catalog, addr)?;
        let file_offset =
            abs_addr_to_file_offset(addr, mapping.start(), module.executable_segment_offset())?;
        let function = module.find_function_by_offset(file_offset, lookup)?;
        let resolved = ResolvedFunction {
            mapping: Some(mapping),
            module,
            function,
        };
        Some(resolved)
    }

    /// Find the absolute start address of the function containing
    /// absolute address `addr`.
    #[cfg_attr(feature = "tracing", crate::log::instrument(skip_all, fields(addr = format_args!("{addr:#x}"))))]
    pub fn find_function_start_addr(
        &self,
        catalog: &dyn ModuleCatalog,
        capture: &dyn CaptureView,
        addr: Addr,
    ) -> Option<Addr> {
        Self::first_resolution(addr, |strategy| {
            strategy.function_start(self, catalog, capture, addr)
        })
    }

    /// Retrieve the display name of the function containing absolute
    /// address `addr`.
    ///
    /// The returned name is never empty. If the function is not known,
    /// [`UNKNOWN_NAME`] is reported.
    #[cfg_attr(feature = "tracing", crate::log::instrument(skip_all, fields(addr = format_args!("{addr:#x}"))))]
    pub fn function_name<'a>(
        &self,
        catalog: &'a dyn ModuleCatalog,
        capture: &'a dyn CaptureView,
        addr: Addr,
    ) -> Cow<'a, str> {
        Self::first_resolution(addr, |strategy| {
            strategy.function_name(self, catalog, capture, addr)
        })
        .unwrap_or(Cow::Borrowed(UNKNOWN_NAME))
    }

    /// Retrieve the display names of the functions containing the
    /// provided absolute addresses, in input order.
    #[cfg_attr(feature = "tracing", crate::log::instrument(skip_all, fields(addrs = ?Hexify(addrs))))]
    pub fn function_names<'a>(
        &self,
        catalog: &'a dyn ModuleCatalog,
        capture: &'a dyn CaptureView,
        addrs: &[Addr],
    ) -> Vec<Cow<'a, str>> {
        addrs
            .iter()
            .map(|addr| self.function_name(catalog, capture, *addr))
            .collect()
    }

    /// Retrieve the path of the module containing absolute address
    /// `addr`.
    ///
    /// If the module is not known, [`UNKNOWN_NAME`] is reported.
    #[cfg_attr(feature = "tracing", crate::log::instrument(skip_all, fields(addr = format_args!("{addr:#x}"))))]
    pub fn module_path<'a>(
        &self,
        catalog: &'a dyn ModuleCatalog,
        capture: &'a dyn CaptureView,
        addr: Addr,
    ) -> Cow<'a, str> {
        Self::first_resolution(addr, |strategy| {
            strategy.module_path(self, catalog, capture, addr)
        })
        .unwrap_or(Cow::Borrowed(UNKNOWN_NAME))
    }

    /// Resolve absolute address `addr` to a symbol.
    #[cfg_attr(feature = "tracing", crate::log::instrument(skip_all, fields(addr = format_args!("{addr:#x}"))))]
    pub fn symbolize<'a>(
        &self,
        catalog: &'a dyn ModuleCatalog,
        capture: &'a dyn CaptureView,
        addr: Addr,
    ) -> Symbolized<'a> {
        Self::first_resolution(addr, |strategy| {
            strategy.symbolize(self, catalog, capture, addr)
        })
        .map(Symbolized::Sym)
        .unwrap_or(Symbolized::Unknown)
    }

    /// Resolve absolute address `addr` to a symbol, using only the
    /// provided strategy.
    pub fn symbolize_with<'a>(
        &self,
        strategy: Strategy,
        catalog: &'a dyn ModuleCatalog,
        capture: &'a dyn CaptureView,
        addr: Addr,
    ) -> Option<Sym<'a>> {
        strategy.symbolize(self, catalog, capture, addr)
    }

    /// Find a function by the identity of its module and its offset
    /// into the module file.
    ///
    /// The lookup is always exact: offsets between functions do not
    /// resolve.
    #[cfg_attr(feature = "tracing", crate::log::instrument(skip(self, catalog), fields(path = ?path, file_offset = format_args!("{file_offset:#x}"))))]
    pub fn find_function_by_identity<'a>(
        &self,
        catalog: &'a dyn ModuleCatalog,
        path: &Path,
        build_id: &str,
        file_offset: u64,
    ) -> Option<ResolvedFunction<'a>> {
        let Some(module) = catalog.find_module_by_identity(path, build_id) else {
            debug!(
                "module `{}` with build ID `{build_id}` is not known",
                path.display()
            );
            return None
        };
        let virt_addr = file_offset_to_virt_addr(file_offset, module.load_bias())?;
        let function = module.find_function_by_virt_addr(virt_addr, Lookup::Exact)?;
        let resolved = ResolvedFunction {
            mapping: None,
            module,
            function,
        };
        Some(resolved)
    }

    /// Find the ID of an instrumented function in the capture.
    ///
    /// This method scans all instrumented functions and hence is linear
    /// in their number.
    pub fn find_instrumented_function_id_slow(
        &self,
        capture: &dyn CaptureView,
        function: &ResolvedFunction<'_>,
    ) -> Option<u64> {
        let file_offset = function.file_offset()?;
        let path = function.module.path();
        capture
            .instrumented_functions()
            .iter()
            .find(|instrumented| instrumented.targets(path, file_offset))
            .map(|instrumented| instrumented.id)
    }

    /// Retrieve the display name of a function, demangling it if
    /// configured to do so.
    pub fn display_name<'a>(&self, function: &'a FunctionRecord) -> Cow<'a, str> {
        maybe_demangle(function.name(), self.demangle)
    }
}
