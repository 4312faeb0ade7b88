use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;


/// A function the tracer was configured to instrument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstrumentedFunction {
    /// The ID under which the tracer reports events for the function.
    pub id: u64,
    /// The path of the module file containing the function.
    pub file_path: PathBuf,
    /// The offset of the function into the module file.
    pub file_offset: u64,
}

impl InstrumentedFunction {
    /// Check whether this entry targets the function at `file_offset`
    /// in the file at `file_path`.
    #[inline]
    pub fn targets(&self, file_path: &Path, file_offset: u64) -> bool {
        self.file_offset == file_offset && self.file_path == file_path
    }
}


/// The catalog of instrumented functions of a capture, keyed by ID.
#[derive(Clone, Debug, Default)]
pub struct InstrumentedFunctions {
    functions: BTreeMap<u64, InstrumentedFunction>,
}

impl InstrumentedFunctions {
    /// Create a new, empty [`InstrumentedFunctions`] catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing and returning one with the same ID.
    pub fn insert(&mut self, function: InstrumentedFunction) -> Option<InstrumentedFunction> {
        self.functions.insert(function.id, function)
    }

    /// Retrieve the entry with the given ID.
    #[inline]
    pub fn get(&self, id: u64) -> Option<&InstrumentedFunction> {
        self.functions.get(&id)
    }

    /// Retrieve the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check whether the catalog is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Iterate over all entries, ordered by ID.
    #[inline]
    pub fn iter(&self) -> btree_map::Values<'_, u64, InstrumentedFunction> {
        self.functions.values()
    }
}

impl<'slf> IntoIterator for &'slf InstrumentedFunctions {
    type Item = &'slf InstrumentedFunction;
    type IntoIter = btree_map::Values<'slf, u64, InstrumentedFunction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<InstrumentedFunction> for InstrumentedFunctions {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = InstrumentedFunction>,
    {
        Self {
            functions: iter
                .into_iter()
                .map(|function| (function.id, function))
                .collect(),
        }
    }
}
