use crate::hints::AddressHints;
use crate::hints::CaptureAddressHints;
use crate::instrumented::InstrumentedFunctions;
use crate::process::ProcessAddressSpace;
use crate::process::ProcessMaps;


/// A read-only view of the data recorded during a capture.
pub trait CaptureView {
    /// The address space of the captured process.
    fn process(&self) -> &dyn ProcessAddressSpace;

    /// Address resolutions recorded while capturing.
    fn address_hints(&self) -> &dyn CaptureAddressHints;

    /// The functions instrumented during the capture.
    fn instrumented_functions(&self) -> &InstrumentedFunctions;
}


/// The data of a capture, owning all its parts.
///
/// Mutation requires exclusive access. Callers sharing a
/// [`CaptureData`] object with a thread ingesting new data should wrap
/// it in a lock.
#[derive(Clone, Debug, Default)]
pub struct CaptureData {
    process: ProcessMaps,
    address_hints: AddressHints,
    instrumented_functions: InstrumentedFunctions,
}

impl CaptureData {
    /// Create a new [`CaptureData`] object for a process with the
    /// provided memory mappings.
    pub fn new(process: ProcessMaps) -> Self {
        Self {
            process,
            ..Default::default()
        }
    }

    /// Replace the instrumented function catalog.
    pub fn with_instrumented_functions(mut self, functions: InstrumentedFunctions) -> Self {
        self.instrumented_functions = functions;
        self
    }

    /// Replace the address hints.
    pub fn with_address_hints(mut self, hints: AddressHints) -> Self {
        self.address_hints = hints;
        self
    }

    /// Retrieve the process' memory mappings.
    #[inline]
    pub fn process_maps(&self) -> &ProcessMaps {
        &self.process
    }

    /// Replace the process' memory mappings, e.g., after a new snapshot
    /// has been taken.
    pub fn set_process_maps(&mut self, process: ProcessMaps) {
        self.process = process;
    }

    /// Retrieve the address hints for mutation.
    #[inline]
    pub fn address_hints_mut(&mut self) -> &mut AddressHints {
        &mut self.address_hints
    }

    /// Retrieve the instrumented function catalog for mutation.
    #[inline]
    pub fn instrumented_functions_mut(&mut self) -> &mut InstrumentedFunctions {
        &mut self.instrumented_functions
    }
}

impl CaptureView for CaptureData {
    #[inline]
    fn process(&self) -> &dyn ProcessAddressSpace {
        &self.process
    }

    #[inline]
    fn address_hints(&self) -> &dyn CaptureAddressHints {
        &self.address_hints
    }

    #[inline]
    fn instrumented_functions(&self) -> &InstrumentedFunctions {
        &self.instrumented_functions
    }
}
