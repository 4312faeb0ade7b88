use std::io::Read;
use std::ops::Range;
use std::path::Path;
use std::path::PathBuf;

use crate::log::trace;
use crate::log::warn;
use crate::maps;
use crate::maps::MapsEntry;
use crate::maps::Pid;
use crate::util::find_match_or_lower_bound_by_key;
use crate::Addr;
use crate::Error;
use crate::ErrorExt as _;
use crate::Result;


/// A memory mapping of (part of) a module file in a process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryMapping {
    /// The absolute address range covered by the mapping.
    pub range: Range<Addr>,
    /// The path of the file backing the mapping.
    pub path: PathBuf,
    /// The build ID of the file backing the mapping, if it was reported.
    ///
    /// If present, it identifies the exact version of the module that
    /// got mapped.
    pub build_id: Option<String>,
}

impl MemoryMapping {
    /// Create a new [`MemoryMapping`] without build ID information.
    pub fn new(range: Range<Addr>, path: impl Into<PathBuf>) -> Self {
        Self {
            range,
            path: path.into(),
            build_id: None,
        }
    }

    /// Attach the build ID of the backing file to this mapping.
    pub fn with_build_id(mut self, build_id: impl Into<String>) -> Self {
        self.build_id = Some(build_id.into());
        self
    }

    /// The first address covered by the mapping.
    #[inline]
    pub fn start(&self) -> Addr {
        self.range.start
    }

    /// The address one past the last one covered by the mapping.
    #[inline]
    pub fn end(&self) -> Addr {
        self.range.end
    }

    /// The path of the file backing the mapping.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemoryMapping {
    fn from_maps_entry(entry: MapsEntry) -> Self {
        let MapsEntry {
            range,
            offset,
            path,
            ..
        } = entry;
        trace!(
            "found mapping {:#x}-{:#x} of `{}` at file offset {offset:#x}",
            range.start,
            range.end,
            path.display()
        );
        Self::new(range, path)
    }
}


/// The address space of a process, at the granularity of memory mapped
/// module files.
pub trait ProcessAddressSpace {
    /// Find the memory mapping containing `addr`.
    fn find_mapping(&self, addr: Addr) -> Option<&MemoryMapping>;
}


/// A snapshot of the module mappings of a process.
///
/// Mappings are kept sorted by start address and are guaranteed not to
/// overlap, so that lookups are a binary search.
#[derive(Clone, Debug, Default)]
pub struct ProcessMaps {
    mappings: Box<[MemoryMapping]>,
}

impl ProcessMaps {
    /// Create a [`ProcessMaps`] object from a set of mappings.
    ///
    /// Mappings may be provided in any order. Empty or inverted address
    /// ranges and overlapping mappings are rejected.
    pub fn new<I>(mappings: I) -> Result<Self>
    where
        I: IntoIterator<Item = MemoryMapping>,
    {
        let mut mappings = mappings.into_iter().collect::<Vec<_>>();
        let () = mappings.sort_by_key(MemoryMapping::start);

        for mapping in &mappings {
            if mapping.range.start >= mapping.range.end {
                let err = Error::with_invalid_data(format!(
                    "mapping of `{}` has invalid address range {:#x}-{:#x}",
                    mapping.path.display(),
                    mapping.range.start,
                    mapping.range.end,
                ));
                warn!("{err}");
                return Err(err)
            }
        }

        for pair in mappings.windows(2) {
            if let [prev, next] = pair {
                if prev.range.end > next.range.start {
                    let err = Error::with_invalid_data(format!(
                        "mapping {:#x}-{:#x} of `{}` overlaps mapping {:#x}-{:#x} of `{}`",
                        prev.range.start,
                        prev.range.end,
                        prev.path.display(),
                        next.range.start,
                        next.range.end,
                        next.path.display(),
                    ));
                    warn!("{err}");
                    return Err(err)
                }
            }
        }

        let slf = Self {
            mappings: mappings.into_boxed_slice(),
        };
        Ok(slf)
    }

    /// Create a [`ProcessMaps`] object from text in the format of
    /// `/proc/<pid>/maps`.
    ///
    /// Only executable mappings backed by files are retained.
    pub fn from_reader<R>(reader: R) -> Result<Self>
    where
        R: Read,
    {
        let mappings = Self::collect_module_code(maps::parse_file(reader))?;
        Self::new(mappings)
    }

    /// Create a [`ProcessMaps`] object from the current memory mappings
    /// of a live process.
    pub fn from_pid(pid: Pid) -> Result<Self> {
        let entries = maps::parse(pid)?;
        let mappings = Self::collect_module_code(entries)
            .with_context(|| format!("failed to read memory mappings of process {pid}"))?;
        Self::new(mappings)
    }

    fn collect_module_code<E>(entries: E) -> Result<Vec<MemoryMapping>>
    where
        E: Iterator<Item = Result<MapsEntry>>,
    {
        let mut mappings = Vec::new();
        for entry in entries {
            let entry = entry?;
            if maps::is_module_code(&entry) {
                let () = mappings.push(MemoryMapping::from_maps_entry(entry));
            }
        }
        Ok(mappings)
    }

    /// Retrieve all mappings, ordered by start address.
    #[inline]
    pub fn mappings(&self) -> &[MemoryMapping] {
        &self.mappings
    }
}

impl ProcessAddressSpace for ProcessMaps {
    fn find_mapping(&self, addr: Addr) -> Option<&MemoryMapping> {
        let idx = find_match_or_lower_bound_by_key(&self.mappings, addr, MemoryMapping::start)?;
        let mapping = self.mappings.get(idx)?;
        mapping.range.contains(&addr).then_some(mapping)
    }
}
