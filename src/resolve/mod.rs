//! Functionality for resolving absolute addresses of a captured process
//! to modules and functions.
//!
//! Resolution consults two sources of information, in order:
//! 1. the live process state, i.e., the memory mappings of the process
//!    along with a catalog of modules and their function tables
//! 2. address hints recorded while capturing
//!
//! The first source providing an answer wins. Refer to [`Strategy`] for
//! details.
//!
//! ```
//! use capsym::resolve::Resolver;
//! use capsym::resolve::UNKNOWN_NAME;
//! use capsym::CaptureData;
//! use capsym::FunctionRecord;
//! use capsym::MemoryMapping;
//! use capsym::ModuleManager;
//! use capsym::ModuleRecord;
//! use capsym::ProcessMaps;
//!
//! let module = ModuleRecord::builder("/usr/lib/libfoo.so", "abc")
//!     .load_bias(0x1000)
//!     .function(FunctionRecord::new(0x2050, 0x40, "Foo::Bar"))
//!     .build()
//!     .unwrap();
//! let mut catalog = ModuleManager::new();
//! let _none = catalog.add_module(module);
//!
//! let maps = ProcessMaps::new([MemoryMapping::new(
//!     0x7f0000000000..0x7f0000010000,
//!     "/usr/lib/libfoo.so",
//! )])
//! .unwrap();
//! let capture = CaptureData::new(maps);
//!
//! let resolver = Resolver::new();
//! let name = resolver.function_name(&catalog, &capture, 0x7f0000001060);
//! assert_eq!(name, "Foo::Bar");
//!
//! let name = resolver.function_name(&catalog, &capture, 0x1337);
//! assert_eq!(name, UNKNOWN_NAME);
//! ```

mod resolver;
mod strategy;

use std::borrow::Cow;

#[cfg(feature = "demangle")]
use cpp_demangle::DemangleOptions;
#[cfg(feature = "demangle")]
use cpp_demangle::Symbol;

use crate::Addr;

pub use resolver::Builder;
pub use resolver::ResolvedFunction;
pub use resolver::Resolver;
pub use strategy::Strategy;


/// The name reported for modules and functions that could not be
/// resolved.
pub const UNKNOWN_NAME: &str = "???";


/// A symbol an address resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sym<'a> {
    /// The display name of the function the address belongs to.
    pub name: Cow<'a, str>,
    /// The path of the module containing the function, or
    /// [`UNKNOWN_NAME`] if it is not known.
    pub module_path: Cow<'a, str>,
    /// The absolute address at which the function starts.
    pub addr: Addr,
    /// The byte offset of the resolved address from the start of the
    /// function (i.e., from `addr`).
    pub offset: u64,
    /// The strategy that produced this symbol.
    pub strategy: Strategy,
}


/// The result of resolving an address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Symbolized<'a> {
    /// The address resolved to the provided symbol.
    Sym(Sym<'a>),
    /// The address could not be resolved.
    Unknown,
}

impl<'a> Symbolized<'a> {
    /// Convert the object into a [`Sym`] reference, if the corresponding
    /// variant is active.
    #[inline]
    pub fn as_sym(&self) -> Option<&Sym<'a>> {
        match self {
            Self::Sym(sym) => Some(sym),
            Self::Unknown => None,
        }
    }

    /// Convert the object into a [`Sym`] object, if the corresponding
    /// variant is active.
    #[inline]
    pub fn into_sym(self) -> Option<Sym<'a>> {
        match self {
            Self::Sym(sym) => Some(sym),
            Self::Unknown => None,
        }
    }
}


#[cfg(feature = "demangle")]
fn demangle(name: &str) -> Option<String> {
    if let Ok(demangled) = rustc_demangle::try_demangle(name) {
        return Some(format!("{demangled:#}"))
    }

    Symbol::new(name)
        .ok()?
        .demangle(&DemangleOptions::default())
        .ok()
}

#[cfg(not(feature = "demangle"))]
fn demangle(_name: &str) -> Option<String> {
    None
}

/// Demangle `name` if requested and if it is a mangled Rust or C++
/// symbol. Otherwise it is returned as-is.
pub(crate) fn maybe_demangle(name: &str, enable: bool) -> Cow<'_, str> {
    if !enable {
        return Cow::Borrowed(name)
    }

    match demangle(name) {
        Some(demangled) => Cow::Owned(demangled),
        None => Cow::Borrowed(name),
    }
}
