use std::path::Path;
use std::path::PathBuf;

use crate::address::file_offset_to_virt_addr;
use crate::address::virt_addr_to_file_offset;
use crate::log::warn;
use crate::util::find_match_or_lower_bound_by_key;
use crate::Addr;
use crate::Error;
use crate::Result;


/// The kind of lookup to perform when searching for the function
/// covering an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// The address has to fall into a function's recorded extent, i.e.,
    /// `[start, start + size)`. Functions with a size of zero never
    /// match.
    Exact,
    /// Report the function with the greatest start address less than
    /// or equal to the address, irrespective of its recorded size.
    ///
    /// This lookup tolerates missing or wrong size information.
    Floor,
}


/// A function as recorded in a module's symbol table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionRecord {
    virt_addr: Addr,
    size: u64,
    name: Box<str>,
}

impl FunctionRecord {
    /// Create a new [`FunctionRecord`].
    ///
    /// `virt_addr` is the function's start address relative to the
    /// module's link-time base, as reported by the symbol table.
    pub fn new(virt_addr: Addr, size: u64, name: impl Into<Box<str>>) -> Self {
        Self {
            virt_addr,
            size,
            name: name.into(),
        }
    }

    /// The function's start address, relative to the module's link-time
    /// base.
    #[inline]
    pub fn virt_addr(&self) -> Addr {
        self.virt_addr
    }

    /// The function's size in bytes. May be zero if unknown.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The function's (possibly mangled) name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether the given virtual address falls into the
    /// function's recorded extent.
    #[inline]
    pub fn contains(&self, virt_addr: Addr) -> bool {
        virt_addr
            .checked_sub(self.virt_addr)
            .map(|offset| offset < self.size)
            .unwrap_or(false)
    }
}


/// A builder for [`ModuleRecord`] objects.
#[derive(Debug)]
pub struct ModuleBuilder {
    path: PathBuf,
    build_id: String,
    load_bias: u64,
    executable_segment_offset: u64,
    functions: Vec<FunctionRecord>,
}

impl ModuleBuilder {
    /// Set the module's load bias.
    pub fn load_bias(mut self, load_bias: u64) -> Self {
        self.load_bias = load_bias;
        self
    }

    /// Set the offset of the module's executable segment in the module
    /// file.
    pub fn executable_segment_offset(mut self, offset: u64) -> Self {
        self.executable_segment_offset = offset;
        self
    }

    /// Add a function to the module's function table.
    pub fn function(mut self, function: FunctionRecord) -> Self {
        let () = self.functions.push(function);
        self
    }

    /// Add a set of functions to the module's function table.
    pub fn functions<I>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = FunctionRecord>,
    {
        let () = self.functions.extend(functions);
        self
    }

    /// Create the [`ModuleRecord`].
    ///
    /// Functions are ordered by start address, retaining the relative
    /// order of those sharing one. Functions sharing a start address are
    /// treated as aliases. Functions with distinct starts must not
    /// overlap.
    pub fn build(self) -> Result<ModuleRecord> {
        let ModuleBuilder {
            path,
            build_id,
            load_bias,
            executable_segment_offset,
            mut functions,
        } = self;

        let () = functions.sort_by_key(FunctionRecord::virt_addr);

        for function in &functions {
            if function.virt_addr.checked_add(function.size).is_none() {
                let err = Error::with_invalid_data(format!(
                    "function `{}` in `{}` at {:#x} with size {:#x} exceeds address space",
                    function.name,
                    path.display(),
                    function.virt_addr,
                    function.size,
                ));
                warn!("{err}");
                return Err(err)
            }
        }

        // Functions sharing a start address are aliases. Only distinct
        // starts have to be disjoint, based on the widest alias.
        let mut widest = None::<&FunctionRecord>;
        for function in &functions {
            match widest {
                Some(prev) if prev.virt_addr == function.virt_addr => {
                    if function.size > prev.size {
                        widest = Some(function);
                    }
                }
                Some(prev) if prev.virt_addr + prev.size > function.virt_addr => {
                    let err = Error::with_invalid_data(format!(
                        "function `{}` ({:#x}+{:#x}) overlaps function `{}` ({:#x}+{:#x}) in `{}`",
                        prev.name,
                        prev.virt_addr,
                        prev.size,
                        function.name,
                        function.virt_addr,
                        function.size,
                        path.display(),
                    ));
                    warn!("{err}");
                    return Err(err)
                }
                _ => widest = Some(function),
            }
        }

        let module = ModuleRecord {
            path,
            build_id,
            load_bias,
            executable_segment_offset,
            functions: functions.into_boxed_slice(),
        };
        Ok(module)
    }
}


/// Static meta data about a module along with its function table.
///
/// A module is identified by its path and build ID.
#[derive(Clone, Debug)]
pub struct ModuleRecord {
    path: PathBuf,
    build_id: String,
    load_bias: u64,
    executable_segment_offset: u64,
    /// Functions sorted by virtual address, not overlapping.
    functions: Box<[FunctionRecord]>,
}

impl ModuleRecord {
    /// Retrieve a [`ModuleBuilder`] for the module with the given
    /// identity.
    pub fn builder(path: impl Into<PathBuf>, build_id: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            path: path.into(),
            build_id: build_id.into(),
            load_bias: 0,
            executable_segment_offset: 0,
            functions: Vec::new(),
        }
    }

    /// The path of the module file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The module's build ID.
    #[inline]
    pub fn build_id(&self) -> &str {
        &self.build_id
    }

    /// The module's load bias.
    #[inline]
    pub fn load_bias(&self) -> u64 {
        self.load_bias
    }

    /// The offset of the module's executable segment in the file.
    #[inline]
    pub fn executable_segment_offset(&self) -> u64 {
        self.executable_segment_offset
    }

    /// The module's functions, ordered by virtual address.
    #[inline]
    pub fn functions(&self) -> &[FunctionRecord] {
        &self.functions
    }

    /// Check whether this module has the given identity.
    #[inline]
    pub fn has_identity(&self, path: &Path, build_id: &str) -> bool {
        self.path == path && self.build_id == build_id
    }

    /// Find the function covering a module virtual address.
    ///
    /// If several functions start at the same address, the first one in
    /// table order that satisfies the lookup is reported.
    pub fn find_function_by_virt_addr(
        &self,
        virt_addr: Addr,
        lookup: Lookup,
    ) -> Option<&FunctionRecord> {
        let idx =
            find_match_or_lower_bound_by_key(&self.functions, virt_addr, FunctionRecord::virt_addr)?;
        let candidates = &self.functions[idx..];
        let start = candidates.first()?.virt_addr;
        let mut same_start = candidates.iter().take_while(|f| f.virt_addr == start);

        match lookup {
            Lookup::Floor => same_start.next(),
            Lookup::Exact => same_start.find(|f| f.contains(virt_addr)),
        }
    }

    /// Find the function covering an offset into the module file.
    pub fn find_function_by_offset(
        &self,
        file_offset: u64,
        lookup: Lookup,
    ) -> Option<&FunctionRecord> {
        let virt_addr = file_offset_to_virt_addr(file_offset, self.load_bias)?;
        self.find_function_by_virt_addr(virt_addr, lookup)
    }

    /// Calculate the offset of a function of this module into the
    /// module file.
    #[inline]
    pub fn function_file_offset(&self, function: &FunctionRecord) -> Option<u64> {
        virt_addr_to_file_offset(function.virt_addr, self.load_bias)
    }
}
