#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]


pub mod address;
mod capture;
mod catalog;
mod error;
mod hints;
mod instrumented;
mod log;
mod maps;
mod module;
mod process;
pub mod resolve;
mod util;


pub use crate::capture::CaptureData;
pub use crate::capture::CaptureView;
pub use crate::catalog::ModuleCatalog;
pub use crate::catalog::ModuleManager;
pub use crate::error::Error;
pub use crate::error::ErrorExt;
pub use crate::error::ErrorKind;
pub use crate::error::IntoError;
pub use crate::hints::AddressHint;
pub use crate::hints::AddressHints;
pub use crate::hints::CaptureAddressHints;
pub use crate::instrumented::InstrumentedFunction;
pub use crate::instrumented::InstrumentedFunctions;
pub use crate::maps::Pid;
pub use crate::module::FunctionRecord;
pub use crate::module::Lookup;
pub use crate::module::ModuleBuilder;
pub use crate::module::ModuleRecord;
pub use crate::process::MemoryMapping;
pub use crate::process::ProcessAddressSpace;
pub use crate::process::ProcessMaps;
pub use crate::resolve::Resolver;


/// A type representing addresses.
pub type Addr = u64;

/// A result type using our [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;
